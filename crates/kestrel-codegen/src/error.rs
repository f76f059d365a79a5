//! Code generation errors

use thiserror::Error;

use crate::ir::{NodeKey, QualifiedName, SourceLocation};

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors raised while resolving symbols or lowering a class
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    /// Two distinct definitions share one qualified name
    #[error("Duplicate symbol: {name} is defined at {} and {}", format_location(.first), format_location(.second))]
    DuplicateSymbol {
        name: QualifiedName,
        first: Option<SourceLocation>,
        second: Option<SourceLocation>,
    },

    /// A referenced name is not registered
    #[error("Unresolved symbol: {name} (referenced from {referenced_from})")]
    UnresolvedSymbol {
        name: QualifiedName,
        referenced_from: QualifiedName,
        location: Option<SourceLocation>,
    },

    /// A class is its own ancestor
    #[error("Inheritance cycle: {}", format_cycle(.cycle))]
    InheritanceCycle {
        cycle: Vec<QualifiedName>,
        location: Option<SourceLocation>,
    },

    /// A declarative node is reachable from itself
    #[error("Cyclic declarative tree in {class}: node {node} ({target}) contains itself")]
    CyclicDeclarativeTree {
        class: QualifiedName,
        node: NodeKey,
        target: QualifiedName,
        location: Option<SourceLocation>,
    },

    /// A declarative node has more than one parent
    #[error("Shared declarative node in {class}: node {node} ({target}) is reached twice")]
    SharedDeclarativeNode {
        class: QualifiedName,
        node: NodeKey,
        target: QualifiedName,
        location: Option<SourceLocation>,
    },

    /// A declarative node references a key that is not in the arena
    #[error("Dangling node reference in {class}: node {node} does not exist")]
    DanglingNodeReference {
        class: QualifiedName,
        node: NodeKey,
        location: Option<SourceLocation>,
    },

    /// The declarative arena itself is inconsistent
    #[error("Malformed declarative tree in {class}: {reason}")]
    MalformedDeclarativeTree {
        class: QualifiedName,
        reason: String,
        location: Option<SourceLocation>,
    },

    /// An identity binding name is used twice in one class
    #[error("Duplicate identity binding '{name}' in {class}")]
    DuplicateIdentityBinding {
        class: QualifiedName,
        name: String,
        location: Option<SourceLocation>,
    },

    /// An event binding targets a node outside the tree
    #[error("Event '{event}' in {class} targets unknown node {node}")]
    UnknownEventTarget {
        class: QualifiedName,
        event: String,
        node: NodeKey,
        location: Option<SourceLocation>,
    },

    /// A module declares no classes
    #[error("Module {module} declares no classes")]
    EmptyModule {
        module: QualifiedName,
        location: Option<SourceLocation>,
    },

    /// The run was cancelled
    #[error("Compilation cancelled")]
    Cancelled,

    /// A class task failed unexpectedly
    #[error("Internal code generator error in {class}: {message}")]
    Internal { class: QualifiedName, message: String },
}

impl CodegenError {
    /// Source location of the offending construct, when known
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CodegenError::DuplicateSymbol { second, first, .. } => {
                second.as_ref().or(first.as_ref())
            }
            CodegenError::UnresolvedSymbol { location, .. }
            | CodegenError::InheritanceCycle { location, .. }
            | CodegenError::CyclicDeclarativeTree { location, .. }
            | CodegenError::SharedDeclarativeNode { location, .. }
            | CodegenError::DanglingNodeReference { location, .. }
            | CodegenError::MalformedDeclarativeTree { location, .. }
            | CodegenError::DuplicateIdentityBinding { location, .. }
            | CodegenError::UnknownEventTarget { location, .. }
            | CodegenError::EmptyModule { location, .. } => location.as_ref(),
            CodegenError::Cancelled | CodegenError::Internal { .. } => None,
        }
    }

    /// Qualified name the error is reported against
    pub fn subject(&self) -> Option<&QualifiedName> {
        match self {
            CodegenError::DuplicateSymbol { name, .. } => Some(name),
            CodegenError::UnresolvedSymbol {
                referenced_from, ..
            } => Some(referenced_from),
            CodegenError::InheritanceCycle { cycle, .. } => cycle.first(),
            CodegenError::CyclicDeclarativeTree { class, .. }
            | CodegenError::SharedDeclarativeNode { class, .. }
            | CodegenError::DanglingNodeReference { class, .. }
            | CodegenError::MalformedDeclarativeTree { class, .. }
            | CodegenError::DuplicateIdentityBinding { class, .. }
            | CodegenError::UnknownEventTarget { class, .. }
            | CodegenError::Internal { class, .. } => Some(class),
            CodegenError::EmptyModule { module, .. } => Some(module),
            CodegenError::Cancelled => None,
        }
    }

    /// Attach a location if the error does not carry one yet
    pub fn or_location(mut self, fallback: Option<&SourceLocation>) -> Self {
        if let Some(slot) = self.location_slot() {
            if slot.is_none() {
                *slot = fallback.cloned();
            }
        }
        self
    }

    fn location_slot(&mut self) -> Option<&mut Option<SourceLocation>> {
        match self {
            CodegenError::UnresolvedSymbol { location, .. }
            | CodegenError::InheritanceCycle { location, .. }
            | CodegenError::CyclicDeclarativeTree { location, .. }
            | CodegenError::SharedDeclarativeNode { location, .. }
            | CodegenError::DanglingNodeReference { location, .. }
            | CodegenError::MalformedDeclarativeTree { location, .. }
            | CodegenError::DuplicateIdentityBinding { location, .. }
            | CodegenError::UnknownEventTarget { location, .. }
            | CodegenError::EmptyModule { location, .. } => Some(location),
            CodegenError::DuplicateSymbol { .. }
            | CodegenError::Cancelled
            | CodegenError::Internal { .. } => None,
        }
    }
}

fn format_location(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => loc.to_string(),
        None => "<unknown>".to_string(),
    }
}

fn format_cycle(cycle: &[QualifiedName]) -> String {
    cycle
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Every failure of one compilation, in (module, class) order
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", format_summary(.errors))]
pub struct CompileErrors {
    pub errors: Vec<CodegenError>,
}

fn format_summary(errors: &[CodegenError]) -> String {
    match errors.first() {
        Some(first) => format!(
            "{} error(s) during code generation; first: {}",
            errors.len(),
            first
        ),
        None => "0 error(s) during code generation".to_string(),
    }
}

impl CompileErrors {
    pub fn new(errors: Vec<CodegenError>) -> Self {
        Self { errors }
    }

    /// Whether the run was cancelled rather than failing on input
    pub fn is_cancelled(&self) -> bool {
        self.errors.iter().any(|e| matches!(e, CodegenError::Cancelled))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodegenError> {
        self.errors.iter()
    }
}

impl From<CodegenError> for CompileErrors {
    fn from(error: CodegenError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<CodegenError>> for CompileErrors {
    fn from(errors: Vec<CodegenError>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inheritance_cycle_message() {
        let err = CodegenError::InheritanceCycle {
            cycle: vec!["a.A".into(), "b.B".into(), "a.A".into()],
            location: None,
        };
        assert_eq!(err.to_string(), "Inheritance cycle: a.A -> b.B -> a.A");
    }

    #[test]
    fn test_or_location_keeps_existing() {
        let here = SourceLocation::new("App.mxml", 3, 5);
        let there = SourceLocation::new("Other.mxml", 1, 1);
        let err = CodegenError::EmptyModule {
            module: "App".into(),
            location: Some(here.clone()),
        }
        .or_location(Some(&there));
        assert_eq!(err.location(), Some(&here));

        let err = CodegenError::EmptyModule {
            module: "App".into(),
            location: None,
        }
        .or_location(Some(&there));
        assert_eq!(err.location(), Some(&there));
    }

    #[test]
    fn test_compile_errors_summary() {
        let errors = CompileErrors::new(vec![CodegenError::Cancelled]);
        assert!(errors.is_cancelled());
        assert_eq!(
            errors.to_string(),
            "1 error(s) during code generation; first: Compilation cancelled"
        );
    }
}
