//! Modules, externs and whole programs

use serde::{Deserialize, Serialize};

use super::class::ClassNode;
use super::types::{QualifiedName, SourceLocation, SymbolKind, Visibility};

/// One source file: a provided symbol plus the classes declared in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleIr {
    /// Provided symbol (usually the primary class)
    pub name: QualifiedName,
    /// Source file path
    #[serde(default)]
    pub source: Option<String>,
    /// Imports as written in source. Advisory only.
    #[serde(default)]
    pub imports: Vec<QualifiedName>,
    /// Classes in declaration order
    #[serde(default)]
    pub classes: Vec<ClassNode>,
}

impl ModuleIr {
    /// Module with no classes yet
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            source: None,
            imports: Vec::new(),
            classes: Vec::new(),
        }
    }

    /// Module containing a single class named after it
    pub fn single(class: ClassNode) -> Self {
        Self {
            name: class.name.clone(),
            source: class.location.as_ref().map(|l| l.file.clone()),
            imports: Vec::new(),
            classes: vec![class],
        }
    }

    /// Add a class
    pub fn with_class(mut self, class: ClassNode) -> Self {
        self.classes.push(class);
        self
    }

    /// Record an import
    pub fn with_import(mut self, import: impl Into<QualifiedName>) -> Self {
        self.imports.push(import.into());
        self
    }
}

/// A symbol known to the program but compiled elsewhere (library classes,
/// runtime support classes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSymbol {
    /// Fully qualified name
    pub name: QualifiedName,
    /// Class or interface
    #[serde(default)]
    pub kind: SymbolKind,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Base class
    #[serde(default)]
    pub base: Option<QualifiedName>,
    /// Implemented or extended interfaces
    #[serde(default)]
    pub interfaces: Vec<QualifiedName>,
    /// Emits reflection data
    #[serde(default)]
    pub reflectable: bool,
    /// Declares bindable members
    #[serde(default)]
    pub bindable: bool,
    /// Instances dispatch events
    #[serde(default)]
    pub dispatches_events: bool,
    /// Declaration site
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl SourceSymbol {
    /// Plain public class symbol
    pub fn class(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Class,
            visibility: Visibility::Public,
            base: None,
            interfaces: Vec::new(),
            reflectable: false,
            bindable: false,
            dispatches_events: false,
            location: None,
        }
    }

    /// Plain public interface symbol
    pub fn interface(name: impl Into<QualifiedName>) -> Self {
        Self {
            kind: SymbolKind::Interface,
            ..Self::class(name)
        }
    }

    /// Set the base class
    pub fn extends(mut self, base: impl Into<QualifiedName>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Mark as an event dispatcher
    pub fn dispatching_events(mut self) -> Self {
        self.dispatches_events = true;
        self
    }

    /// Symbol stub for a class compiled in this program
    pub fn from_class(class: &ClassNode) -> Self {
        Self {
            name: class.name.clone(),
            kind: class.kind,
            visibility: class.visibility,
            base: class.base.clone(),
            interfaces: class.interfaces.clone(),
            reflectable: class.metadata.reflectable,
            bindable: class.has_bindable_members(),
            dispatches_events: false,
            location: class.location.clone(),
        }
    }

    /// Whether two registrations describe the same definition.
    /// The location is not part of the definition.
    pub fn same_definition(&self, other: &SourceSymbol) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.visibility == other.visibility
            && self.base == other.base
            && self.interfaces == other.interfaces
            && self.reflectable == other.reflectable
            && self.bindable == other.bindable
            && self.dispatches_events == other.dispatches_events
    }
}

/// Complete input to one compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Symbols compiled elsewhere
    #[serde(default)]
    pub externs: Vec<SourceSymbol>,
    /// Modules to compile
    #[serde(default)]
    pub modules: Vec<ModuleIr>,
}

impl Program {
    /// Empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON dump of the front-end output
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Add an extern symbol
    pub fn with_extern(mut self, symbol: SourceSymbol) -> Self {
        self.externs.push(symbol);
        self
    }

    /// Add a module
    pub fn with_module(mut self, module: ModuleIr) -> Self {
        self.modules.push(module);
        self
    }

    /// Every class in (module, class) order
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.modules.iter().flat_map(|m| m.classes.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_definition_ignores_location() {
        let mut a = SourceSymbol::class("ui.Button").extends("ui.UIBase");
        let mut b = a.clone();
        a.location = Some(SourceLocation::new("a.as", 1, 1));
        b.location = Some(SourceLocation::new("b.as", 9, 4));
        assert!(a.same_definition(&b));

        b.base = None;
        assert!(!a.same_definition(&b));
    }

    #[test]
    fn test_program_from_json() {
        let program = Program::from_json(
            r#"{
                "externs": [{"name": "core.Application", "dispatches_events": true}],
                "modules": [{"name": "App", "classes": [{"name": "App", "base": "core.Application"}]}]
            }"#,
        )
        .unwrap();

        assert_eq!(program.externs.len(), 1);
        assert!(program.externs[0].dispatches_events);
        let classes: Vec<_> = program.classes().collect();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].base.as_ref().map(|b| b.as_str()), Some("core.Application"));
        assert!(classes[0].metadata.reflectable);
    }
}
