//! Resolved symbols

use std::fmt;

use crate::ir::{QualifiedName, SourceLocation, SymbolKind, Visibility};

/// Index of a symbol in the frozen table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym{}", self.0)
    }
}

/// Capabilities inherited down the base chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Emits reflection data
    pub reflectable: bool,
    /// Declares or inherits bindable members
    pub bindable: bool,
    /// Instances dispatch events
    pub dispatches_events: bool,
}

impl Capabilities {
    /// Union of two capability sets
    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities {
            reflectable: self.reflectable || other.reflectable,
            bindable: self.bindable || other.bindable,
            dispatches_events: self.dispatches_events || other.dispatches_events,
        }
    }
}

/// A resolved class or interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Table index
    pub id: SymbolId,
    /// Fully qualified name
    pub qualified: QualifiedName,
    /// Class or interface
    pub kind: SymbolKind,
    /// Declared visibility
    pub visibility: Visibility,
    /// Direct base class
    pub base: Option<SymbolId>,
    /// Directly implemented or extended interfaces
    pub interfaces: Vec<SymbolId>,
    /// Own capabilities merged with every ancestor's
    pub capabilities: Capabilities,
    /// Identifier used for this symbol in emitted code
    pub output_name: String,
    /// Declaration site
    pub location: Option<SourceLocation>,
}

impl Symbol {
    /// Unqualified name
    pub fn simple_name(&self) -> &str {
        self.qualified.simple_name()
    }

    /// Declaring package
    pub fn package(&self) -> &str {
        self.qualified.package()
    }

    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, SymbolKind::Interface)
    }
}
