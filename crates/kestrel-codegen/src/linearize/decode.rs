//! Decoding of encoded instruction arrays
//!
//! Mirrors what the runtime graph builder does with the array, minus the
//! instantiation. Used to check that encodings are well formed.

use thiserror::Error;

use super::instruction::{
    Encoded, EXPOSED_ID_PROPERTY, ROOT_CONTENT_PROPERTY, SYNTHETIC_ID_PROPERTY,
};

/// Malformed encoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of instruction array while reading {0}")]
    UnexpectedEnd(&'static str),

    #[error("Expected {expected} at position {position}")]
    Unexpected {
        expected: &'static str,
        position: usize,
    },

    #[error("{0} trailing element(s) after the instruction")]
    TrailingData(usize),
}

/// Decoded property value
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// Marker `true`
    Simple(Encoded),
    /// Marker `false`
    Node(Box<DecodedNode>),
    /// Marker `null`
    Nodes(Vec<DecodedNode>),
}

/// Structural view of one encoded node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedNode {
    /// Class reference (`None` for the root)
    pub target: Option<String>,
    /// Identity property and binding field name
    pub binding: Option<(String, String)>,
    /// Properties other than the identity binding
    pub properties: Vec<(String, DecodedValue)>,
    /// Styles
    pub styles: Vec<(String, Encoded)>,
    /// `(event, handler)` listener slots
    pub listeners: Vec<(String, String)>,
    /// Default content
    pub content: Vec<DecodedNode>,
}

impl DecodedNode {
    /// Nodes in pre-order (properties, then content)
    pub fn preorder(&self) -> Vec<&DecodedNode> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a DecodedNode>) {
        out.push(self);
        for (_, value) in &self.properties {
            match value {
                DecodedValue::Node(child) => child.collect(out),
                DecodedValue::Nodes(children) => children.iter().for_each(|c| c.collect(out)),
                DecodedValue::Simple(_) => {}
            }
        }
        for child in &self.content {
            child.collect(out);
        }
    }
}

/// Decode a root encoding (no target, no content slot)
///
/// A node-sequence `mxmlContent` property comes back as content. The
/// linearizer folds an explicit root `mxmlContent` sequence into content, so
/// encodings it produces never carry it as a plain property.
pub fn decode_root(encoded: &[Encoded]) -> Result<DecodedNode, DecodeError> {
    let mut cursor = Cursor::new(encoded);
    let mut node = cursor.body(None)?;
    cursor.finish()?;

    if let Some(pos) = node
        .properties
        .iter()
        .position(|(name, value)| name == ROOT_CONTENT_PROPERTY && matches!(value, DecodedValue::Nodes(_)))
    {
        if let (_, DecodedValue::Nodes(children)) = node.properties.remove(pos) {
            node.content = children;
        }
    }
    Ok(node)
}

/// Decode one nested node encoding
pub fn decode_node(encoded: &[Encoded]) -> Result<DecodedNode, DecodeError> {
    let mut cursor = Cursor::new(encoded);
    let node = cursor.node()?;
    cursor.finish()?;
    Ok(node)
}

/// Decode a concatenation of node encodings
fn decode_sequence(encoded: &[Encoded]) -> Result<Vec<DecodedNode>, DecodeError> {
    let mut cursor = Cursor::new(encoded);
    let mut nodes = Vec::new();
    while !cursor.at_end() {
        nodes.push(cursor.node()?);
    }
    Ok(nodes)
}

struct Cursor<'a> {
    items: &'a [Encoded],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(items: &'a [Encoded]) -> Self {
        Self { items, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.items.len()
    }

    fn finish(&self) -> Result<(), DecodeError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(DecodeError::TrailingData(self.items.len() - self.pos))
        }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a Encoded, DecodeError> {
        let items = self.items;
        let item = items.get(self.pos).ok_or(DecodeError::UnexpectedEnd(what))?;
        self.pos += 1;
        Ok(item)
    }

    fn unexpected(&self, expected: &'static str) -> DecodeError {
        DecodeError::Unexpected {
            expected,
            position: self.pos.saturating_sub(1),
        }
    }

    fn count(&mut self) -> Result<usize, DecodeError> {
        match self.next("count")? {
            Encoded::Int(n) => Ok(*n),
            _ => Err(self.unexpected("count")),
        }
    }

    fn string(&mut self, what: &'static str) -> Result<String, DecodeError> {
        match self.next(what)? {
            Encoded::Str(s) => Ok(s.clone()),
            _ => Err(self.unexpected(what)),
        }
    }

    fn node(&mut self) -> Result<DecodedNode, DecodeError> {
        let target = match self.next("class reference")? {
            Encoded::Class(name) => name.clone(),
            _ => return Err(self.unexpected("class reference")),
        };
        let mut node = self.body(Some(target))?;
        node.content = match self.next("content")? {
            Encoded::Null => Vec::new(),
            Encoded::Array(items) => decode_sequence(items)?,
            _ => return Err(self.unexpected("content")),
        };
        Ok(node)
    }

    fn body(&mut self, target: Option<String>) -> Result<DecodedNode, DecodeError> {
        let mut node = DecodedNode {
            target,
            ..DecodedNode::default()
        };

        let props = self.count()?;
        for i in 0..props {
            let name = self.string("property name")?;
            let marker = self.next("marker")?;
            let value = self.next("property value")?;
            let is_identity = name == EXPOSED_ID_PROPERTY || name == SYNTHETIC_ID_PROPERTY;
            match (marker, value) {
                (Encoded::Bool(true), Encoded::Str(field)) if i == 0 && is_identity => {
                    node.binding = Some((name, field.clone()));
                }
                (Encoded::Bool(true), value) => {
                    node.properties.push((name, DecodedValue::Simple(value.clone())));
                }
                (Encoded::Bool(false), Encoded::Array(items)) => {
                    let child = decode_node(items)?;
                    node.properties.push((name, DecodedValue::Node(Box::new(child))));
                }
                (Encoded::Null, Encoded::Array(items)) => {
                    node.properties.push((name, DecodedValue::Nodes(decode_sequence(items)?)));
                }
                _ => return Err(self.unexpected("property marker and value")),
            }
        }

        let styles = self.count()?;
        for _ in 0..styles {
            let name = self.string("style name")?;
            match self.next("style marker")? {
                Encoded::Bool(true) => {}
                _ => return Err(self.unexpected("style marker")),
            }
            let value = self.next("style value")?.clone();
            node.styles.push((name, value));
        }

        let events = self.count()?;
        for _ in 0..events {
            let event = self.string("event name")?;
            match self.next("handler")? {
                Encoded::Handler(handler) => node.listeners.push((event, handler.clone())),
                _ => return Err(self.unexpected("handler")),
            }
        }

        Ok(node)
    }
}
