//! Front-end IR consumed by the code generator
//!
//! The IR is produced by the parser and type checker (outside this crate) and
//! is read-only here. Every type is serde-loadable so that a driver can feed a
//! JSON dump of the front-end output straight into [`crate::Compiler`].

mod class;
mod declarative;
mod expr;
mod module;
mod types;

pub use class::{
    AccessorSpec, ClassAlias, ClassMetadata, ClassNode, EventBindingSpec, FieldSpec, MethodSpec,
    ParamSpec,
};
pub use declarative::{
    DeclarativeNode, DeclarativeTree, NodeKey, Property, PropertyValue, Style, TreeBuilder,
};
pub use expr::{Expr, Stmt};
pub use module::{ModuleIr, Program, SourceSymbol};
pub use types::{Literal, QualifiedName, SourceLocation, Span, SymbolKind, TypeRef, Visibility};
