//! `CLASS_INFO` and `REFLECTION_INFO` descriptors

use indexmap::IndexMap;

use super::expr::quote;
use super::writer::CodeWriter;
use crate::ir::{SymbolKind, Visibility};

/// One `names` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub name: String,
    pub qualified: String,
    pub kind: SymbolKind,
}

/// Class metadata block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassInfo {
    /// The class's own record first, then aliases
    pub names: Vec<NameRecord>,
    /// Implemented interfaces (output identifiers)
    pub interfaces: Vec<String>,
}

impl ClassInfo {
    /// Object literal text
    pub fn render(&self) -> String {
        let names = self
            .names
            .iter()
            .map(|n| {
                format!(
                    "{{ name: {}, qName: {}, kind: {} }}",
                    quote(&n.name),
                    quote(&n.qualified),
                    quote(n.kind.as_str())
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        if self.interfaces.is_empty() {
            format!("{{ names: [{}] }}", names)
        } else {
            format!(
                "{{ names: [{}], interfaces: [{}] }}",
                names,
                self.interfaces.join(", ")
            )
        }
    }
}

/// Accessor access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    fn as_str(self) -> &'static str {
        match self {
            Access::ReadOnly => "readonly",
            Access::WriteOnly => "writeonly",
            Access::ReadWrite => "readwrite",
        }
    }
}

/// One reflected member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Declared type (qualified), empty for constructors
    pub ty: String,
    /// Declaring class (qualified)
    pub declared_by: String,
    /// Accessors only
    pub access: Option<Access>,
    /// Methods only
    pub parameters: Vec<String>,
    /// Set for members outside the public surface
    pub visibility: Option<Visibility>,
}

impl MemberInfo {
    /// Member with a type and declaring class
    pub fn new(ty: impl Into<String>, declared_by: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            declared_by: declared_by.into(),
            access: None,
            parameters: Vec::new(),
            visibility: None,
        }
    }

    fn render(&self) -> String {
        let mut parts = vec![format!("type: {}", quote(&self.ty))];
        if let Some(access) = self.access {
            parts.push(format!("access: {}", quote(access.as_str())));
        }
        if let Some(visibility) = self.visibility {
            parts.push(format!("visibility: {}", quote(visibility.as_str())));
        }
        parts.push(format!("declaredBy: {}", quote(&self.declared_by)));
        if !self.parameters.is_empty() {
            let params = self
                .parameters
                .iter()
                .map(|p| format!("{}, false", quote(p)))
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("parameters: function () {{ return [ {} ]; }}", params));
        }
        format!("{{ {}}}", parts.join(", "))
    }
}

/// Reflection descriptor: three ordered maps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReflectionInfo {
    pub variables: IndexMap<String, MemberInfo>,
    pub accessors: IndexMap<String, MemberInfo>,
    pub methods: IndexMap<String, MemberInfo>,
}

impl ReflectionInfo {
    /// Whether every map is empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.accessors.is_empty() && self.methods.is_empty()
    }

    /// Function expression text returning the descriptor
    pub fn render(&self) -> String {
        let mut w = CodeWriter::new();
        w.line("function () {");
        w.indent();
        w.line("return {");
        w.indent();
        render_map(&mut w, "variables", &self.variables, ",");
        render_map(&mut w, "accessors", &self.accessors, ",");
        render_map(&mut w, "methods", &self.methods, "");
        w.dedent();
        w.line("};");
        w.dedent();
        w.line("}");
        let text = w.finish();
        text.trim_end().to_string()
    }
}

fn render_map(w: &mut CodeWriter, key: &str, map: &IndexMap<String, MemberInfo>, sep: &str) {
    if map.is_empty() {
        w.line(format!("{}: function () {{return {{}};}}{}", key, sep));
        return;
    }
    w.line(format!("{}: function () {{", key));
    w.indent();
    w.line("return {");
    w.indent();
    let last = map.len() - 1;
    for (i, (name, info)) in map.iter().enumerate() {
        let comma = if i == last { "" } else { "," };
        w.line(format!("{}: {}{}", quote(name), info.render(), comma));
    }
    w.dedent();
    w.line("};");
    w.dedent();
    w.line(format!("}}{}", sep));
}
