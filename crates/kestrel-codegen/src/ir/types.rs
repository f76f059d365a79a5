//! Shared IR value types: names, locations, type references, literals

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted, package-qualified class name (`pkg.sub.Name`)
///
/// Ordering is byte-wise lexical order of the full string. Require lists are
/// sorted with this order, so it is part of the output contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Create a qualified name from its dotted form
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build a name from a package and a simple name
    pub fn from_parts(package: &str, simple: &str) -> Self {
        if package.is_empty() {
            Self(simple.to_string())
        } else {
            Self(format!("{}.{}", package, simple))
        }
    }

    /// The full dotted name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the name
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Everything before the last segment (empty for the default package)
    pub fn package(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Whether the name lives in the default (unnamed) package
    pub fn is_default_package(&self) -> bool {
        !self.0.contains('.')
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Byte range inside a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

/// Where a declaration came from, as reported by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path
    pub file: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
    /// Byte span, when the front-end tracked one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl SourceLocation {
    /// Create a location without a byte span
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            span: None,
        }
    }

    /// Attach a byte span
    pub fn with_span(mut self, start: u32, end: u32) -> Self {
        self.span = Some(Span { start, end });
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Member or class visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible inside the declaring package
    Internal,
    /// Visible to subclasses
    Protected,
    /// Visible to the declaring class only
    Private,
}

impl Visibility {
    /// Lowercase keyword used in reflection markers
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    /// Whether reflection consumers see the member by default
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Kind of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A class
    #[default]
    Class,
    /// An interface
    Interface,
}

impl SymbolKind {
    /// Name used in `CLASS_INFO` records
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
        }
    }
}

/// Runtime-native types. These are provided by the target runtime, never
/// resolved against the symbol table and never required.
pub const BUILTIN_TYPES: &[&str] = &[
    "*", "void", "Object", "Array", "String", "Number", "int", "uint", "Boolean", "Function",
    "Class", "Date", "RegExp", "Error", "Math", "JSON", "XML", "XMLList", "Vector", "Null",
];

/// A declared type as written by the front-end
///
/// Serialized as a plain string: builtin names map to [`TypeRef::Builtin`],
/// anything else is a class reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeRef {
    /// Runtime-native type (`Array`, `String`, `*`, …)
    Builtin(String),
    /// Reference to a declared class or interface
    Class(QualifiedName),
}

impl TypeRef {
    /// Parse a type string, classifying builtins
    pub fn parse(name: &str) -> Self {
        if BUILTIN_TYPES.contains(&name) {
            TypeRef::Builtin(name.to_string())
        } else {
            TypeRef::Class(QualifiedName::new(name))
        }
    }

    /// The `*` (any) type
    pub fn any() -> Self {
        TypeRef::Builtin("*".to_string())
    }

    /// The `void` type
    pub fn void() -> Self {
        TypeRef::Builtin("void".to_string())
    }

    /// Class reference, if this is one
    pub fn as_class(&self) -> Option<&QualifiedName> {
        match self {
            TypeRef::Class(name) => Some(name),
            TypeRef::Builtin(_) => None,
        }
    }

    /// Name as written in source
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Builtin(name) => name,
            TypeRef::Class(name) => name.as_str(),
        }
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::parse(&name)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        match ty {
            TypeRef::Builtin(name) => name,
            TypeRef::Class(name) => name.0,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::parse(name)
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Number(f64),
    /// String literal
    String(String),
}

impl Literal {
    /// Convenience constructor for string literals
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }
}
