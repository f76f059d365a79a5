//! Builder instructions and their flat array encoding
//!
//! Node layout:
//!
//! ```text
//! [Target, propCount, (name, marker, value)*,
//!          styleCount, (name, marker, value)*,
//!          eventCount, (event, handler)*,
//!          content]
//! ```
//!
//! `marker` is `true` for a simple value, `false` for a single nested node
//! (value = array holding the child encoding) and `null` for a node sequence
//! (value = concatenation of the child encodings). The identity binding, when
//! present, is the first property. The root encoding drops `Target` and
//! `content`; root default content travels as the trailing sequence property
//! [`ROOT_CONTENT_PROPERTY`].

use crate::ir::{Expr, Literal, NodeKey, QualifiedName, Style};

/// Builder property receiving a synthesized binding name
pub const SYNTHETIC_ID_PROPERTY: &str = "_id";

/// Builder property receiving a source-given binding name
pub const EXPOSED_ID_PROPERTY: &str = "id";

/// Property carrying the root's default content
pub const ROOT_CONTENT_PROPERTY: &str = "mxmlContent";

/// Identity binding attached to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityBinding {
    /// Field the builder assigns the instance to
    pub name: String,
    /// Source-given (and therefore exposed through an accessor pair)
    pub exposed: bool,
}

impl IdentityBinding {
    /// Builder property name (`id` or `_id`)
    pub fn property(&self) -> &'static str {
        if self.exposed {
            EXPOSED_ID_PROPERTY
        } else {
            SYNTHETIC_ID_PROPERTY
        }
    }
}

/// Value of an instruction property
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionValue {
    /// Literal value
    Literal(Literal),
    /// Expression evaluated against the instance
    Expression(Expr),
    /// One nested node
    Node(Box<Instruction>),
    /// Nested node sequence
    Nodes(Vec<Instruction>),
}

impl InstructionValue {
    /// Whether the value embeds nested instructions
    pub fn is_composite(&self) -> bool {
        matches!(self, InstructionValue::Node(_) | InstructionValue::Nodes(_))
    }
}

/// A property of an instruction
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionProperty {
    pub name: String,
    pub value: InstructionValue,
}

/// A listener slot: event name plus the handler bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub event: String,
    pub handler: String,
}

/// Linearized form of one declarative node
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Source node
    pub node: NodeKey,
    /// Instantiated type
    pub target: QualifiedName,
    /// Identity binding (none for the root)
    pub binding: Option<IdentityBinding>,
    /// Simple properties first, then composite ones, each in declared order
    pub properties: Vec<InstructionProperty>,
    /// Styles in declared order
    pub styles: Vec<Style>,
    /// Listener slots in event declaration order
    pub listeners: Vec<Listener>,
    /// Default content children
    pub content: Vec<Instruction>,
}

impl Instruction {
    /// Number of identity binding properties (0 or 1)
    pub fn identity_arity(&self) -> usize {
        usize::from(self.binding.is_some())
    }

    /// Builder property count, identity binding included
    pub fn property_count(&self) -> usize {
        self.identity_arity() + self.properties.len()
    }

    /// Visit this instruction and every nested one in pre-order
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Instruction)) {
        f(self);
        for property in &self.properties {
            match &property.value {
                InstructionValue::Node(child) => child.walk(f),
                InstructionValue::Nodes(children) => {
                    for child in children {
                        child.walk(f);
                    }
                }
                InstructionValue::Literal(_) | InstructionValue::Expression(_) => {}
            }
        }
        for child in &self.content {
            child.walk(f);
        }
    }

    /// Encode as the class root (no target, no content slot)
    pub fn encode_root(&self, name_of: &dyn Fn(&QualifiedName) -> String) -> Vec<Encoded> {
        let mut out = Vec::new();
        let content = if self.content.is_empty() {
            None
        } else {
            Some(InstructionProperty {
                name: ROOT_CONTENT_PROPERTY.to_string(),
                value: InstructionValue::Nodes(self.content.clone()),
            })
        };
        self.encode_body(content.as_ref(), name_of, &mut out);
        out
    }

    /// Encode as a nested node
    pub fn encode(&self, name_of: &dyn Fn(&QualifiedName) -> String) -> Vec<Encoded> {
        let mut out = Vec::new();
        self.encode_into(name_of, &mut out);
        out
    }

    fn encode_into(&self, name_of: &dyn Fn(&QualifiedName) -> String, out: &mut Vec<Encoded>) {
        out.push(Encoded::Class(name_of(&self.target)));
        self.encode_body(None, name_of, out);
        if self.content.is_empty() {
            out.push(Encoded::Null);
        } else {
            let mut children = Vec::new();
            for child in &self.content {
                child.encode_into(name_of, &mut children);
            }
            out.push(Encoded::Array(children));
        }
    }

    fn encode_body(
        &self,
        extra: Option<&InstructionProperty>,
        name_of: &dyn Fn(&QualifiedName) -> String,
        out: &mut Vec<Encoded>,
    ) {
        out.push(Encoded::Int(self.property_count() + usize::from(extra.is_some())));
        if let Some(binding) = &self.binding {
            out.push(Encoded::Str(binding.property().to_string()));
            out.push(Encoded::Bool(true));
            out.push(Encoded::Str(binding.name.clone()));
        }
        for property in self.properties.iter().chain(extra) {
            out.push(Encoded::Str(property.name.clone()));
            match &property.value {
                InstructionValue::Literal(value) => {
                    out.push(Encoded::Bool(true));
                    out.push(Encoded::Literal(value.clone()));
                }
                InstructionValue::Expression(expr) => {
                    out.push(Encoded::Bool(true));
                    out.push(Encoded::Expr(expr.clone()));
                }
                InstructionValue::Node(child) => {
                    out.push(Encoded::Bool(false));
                    out.push(Encoded::Array(child.encode(name_of)));
                }
                InstructionValue::Nodes(children) => {
                    out.push(Encoded::Null);
                    let mut items = Vec::new();
                    for child in children {
                        child.encode_into(name_of, &mut items);
                    }
                    out.push(Encoded::Array(items));
                }
            }
        }

        out.push(Encoded::Int(self.styles.len()));
        for style in &self.styles {
            out.push(Encoded::Str(style.name.clone()));
            out.push(Encoded::Bool(true));
            out.push(Encoded::Literal(style.value.clone()));
        }

        out.push(Encoded::Int(self.listeners.len()));
        for listener in &self.listeners {
            out.push(Encoded::Str(listener.event.clone()));
            out.push(Encoded::Handler(listener.handler.clone()));
        }
    }
}

/// One element of the encoded instruction array
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    /// Class reference (output name)
    Class(String),
    /// Count
    Int(usize),
    /// Property, style or event name; binding field name
    Str(String),
    /// Marker `true` / `false`
    Bool(bool),
    /// Marker `null` or empty content
    Null,
    /// Literal property value
    Literal(Literal),
    /// Expression property value
    Expr(Expr),
    /// Handler reference (`this.$EHn`)
    Handler(String),
    /// Nested array
    Array(Vec<Encoded>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(key: u32, target: &str, binding: &str, exposed: bool) -> Instruction {
        Instruction {
            node: NodeKey(key),
            target: QualifiedName::new(target),
            binding: Some(IdentityBinding {
                name: binding.to_string(),
                exposed,
            }),
            properties: Vec::new(),
            styles: Vec::new(),
            listeners: Vec::new(),
            content: Vec::new(),
        }
    }

    fn name_of(name: &QualifiedName) -> String {
        name.as_str().to_string()
    }

    #[test]
    fn test_leaf_encoding() {
        let encoded = leaf(1, "models.MyModel", "$ID2", false).encode(&name_of);
        assert_eq!(
            encoded,
            vec![
                Encoded::Class("models.MyModel".into()),
                Encoded::Int(1),
                Encoded::Str("_id".into()),
                Encoded::Bool(true),
                Encoded::Str("$ID2".into()),
                Encoded::Int(0),
                Encoded::Int(0),
                Encoded::Null,
            ]
        );
    }

    #[test]
    fn test_root_encoding_with_sequence_and_listener() {
        let root = Instruction {
            node: NodeKey(0),
            target: QualifiedName::new("core.Application"),
            binding: None,
            properties: vec![InstructionProperty {
                name: "beads".into(),
                value: InstructionValue::Nodes(vec![leaf(1, "HTTPService", "service", true)]),
            }],
            styles: Vec::new(),
            listeners: vec![Listener {
                event: "initialize".into(),
                handler: "$EH0".into(),
            }],
            content: Vec::new(),
        };

        let encoded = root.encode_root(&name_of);
        assert_eq!(encoded[0], Encoded::Int(1));
        assert_eq!(encoded[1], Encoded::Str("beads".into()));
        assert_eq!(encoded[2], Encoded::Null);
        match &encoded[3] {
            Encoded::Array(items) => {
                assert_eq!(items[0], Encoded::Class("HTTPService".into()));
                assert_eq!(items[2], Encoded::Str("id".into()));
                assert_eq!(items[4], Encoded::Str("service".into()));
            }
            other => panic!("expected array, got {other:?}"),
        }
        assert_eq!(
            &encoded[4..],
            &[
                Encoded::Int(0),
                Encoded::Int(1),
                Encoded::Str("initialize".into()),
                Encoded::Handler("$EH0".into()),
            ]
        );
    }
}
