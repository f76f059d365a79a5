//! Declarative object trees
//!
//! Markup classes describe an object graph: each node instantiates a
//! component type and sets properties, some of which hold further nodes.
//! Nodes live in an arena and reference their children by [`NodeKey`], which
//! keeps the IR serializable and lets the linearizer detect malformed input
//! (back-edges, shared children, dangling keys) instead of looping on it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expr::Expr;
use super::types::{Literal, QualifiedName, SourceLocation};

/// Identifier of a node inside one class's declarative tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(pub u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of declarative nodes with a designated root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeTree {
    /// Root node (the class instance itself)
    pub root: NodeKey,
    /// All nodes
    pub nodes: Vec<DeclarativeNode>,
}

impl DeclarativeTree {
    /// Look up a node by key
    pub fn get(&self, key: NodeKey) -> Option<&DeclarativeNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Nodes reachable from the root, each once, root first
    ///
    /// Dangling keys are skipped; the linearizer reports them.
    pub fn reachable(&self) -> Vec<&DeclarativeNode> {
        let by_key: FxHashMap<NodeKey, &DeclarativeNode> =
            self.nodes.iter().map(|n| (n.key, n)).collect();
        let mut seen = FxHashSet::default();
        let mut stack = vec![self.root];
        let mut out = Vec::new();
        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                continue;
            }
            let Some(node) = by_key.get(&key) else {
                continue;
            };
            out.push(*node);
            let children: Vec<NodeKey> = node.child_keys().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

/// One instantiation spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeNode {
    /// Arena key
    pub key: NodeKey,
    /// Instantiated type
    pub target: QualifiedName,
    /// Properties in source declaration order
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Style values in source declaration order
    #[serde(default)]
    pub styles: Vec<Style>,
    /// Source-given identity binding (`id="service"`)
    #[serde(default)]
    pub id: Option<String>,
    /// Default-content children
    #[serde(default)]
    pub content: Vec<NodeKey>,
    /// Declaration site
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl DeclarativeNode {
    /// Node with no properties
    pub fn new(key: NodeKey, target: impl Into<QualifiedName>) -> Self {
        Self {
            key,
            target: target.into(),
            properties: Vec::new(),
            styles: Vec::new(),
            id: None,
            content: Vec::new(),
            location: None,
        }
    }

    /// Keys of every child node, in source order
    pub fn child_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.properties
            .iter()
            .flat_map(|p| match &p.value {
                PropertyValue::Node(key) => vec![*key],
                PropertyValue::Nodes(keys) => keys.clone(),
                PropertyValue::Literal(_) | PropertyValue::Expression(_) => Vec::new(),
            })
            .chain(self.content.iter().copied())
    }
}

/// A property assignment on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Assigned value
    pub value: PropertyValue,
}

/// Value of a node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Literal value
    Literal(Literal),
    /// Expression evaluated in the instance's scope
    Expression(Expr),
    /// A single nested node
    Node(NodeKey),
    /// An ordered sequence of nested nodes
    Nodes(Vec<NodeKey>),
}

impl PropertyValue {
    /// Whether the value holds nested nodes
    pub fn is_composite(&self) -> bool {
        matches!(self, PropertyValue::Node(_) | PropertyValue::Nodes(_))
    }
}

/// A style assignment on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Style name
    pub name: String,
    /// Style value
    pub value: Literal,
}

/// Incremental builder for declarative trees
///
/// Keys are allocated in creation order starting at 0 (the root).
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    nodes: Vec<DeclarativeNode>,
}

impl TreeBuilder {
    /// Start a tree whose root instantiates `root_target`
    pub fn new(root_target: impl Into<QualifiedName>) -> Self {
        Self {
            nodes: vec![DeclarativeNode::new(NodeKey(0), root_target)],
        }
    }

    /// Key of the root node
    pub fn root(&self) -> NodeKey {
        NodeKey(0)
    }

    /// Allocate a detached node
    pub fn node(&mut self, target: impl Into<QualifiedName>) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(DeclarativeNode::new(key, target));
        key
    }

    /// Allocate a node with a source-given identity binding
    pub fn node_with_id(&mut self, target: impl Into<QualifiedName>, id: impl Into<String>) -> NodeKey {
        let key = self.node(target);
        self.node_mut(key).id = Some(id.into());
        key
    }

    /// Set a literal property
    pub fn literal(&mut self, owner: NodeKey, name: impl Into<String>, value: Literal) -> &mut Self {
        self.property(owner, name, PropertyValue::Literal(value))
    }

    /// Set an expression property
    pub fn expression(&mut self, owner: NodeKey, name: impl Into<String>, value: Expr) -> &mut Self {
        self.property(owner, name, PropertyValue::Expression(value))
    }

    /// Set a single-node property
    pub fn child(&mut self, owner: NodeKey, name: impl Into<String>, child: NodeKey) -> &mut Self {
        self.property(owner, name, PropertyValue::Node(child))
    }

    /// Set a node-sequence property
    pub fn children(&mut self, owner: NodeKey, name: impl Into<String>, children: Vec<NodeKey>) -> &mut Self {
        self.property(owner, name, PropertyValue::Nodes(children))
    }

    /// Set a style
    pub fn style(&mut self, owner: NodeKey, name: impl Into<String>, value: Literal) -> &mut Self {
        self.node_mut(owner).styles.push(Style {
            name: name.into(),
            value,
        });
        self
    }

    /// Append default content
    pub fn content(&mut self, owner: NodeKey, child: NodeKey) -> &mut Self {
        self.node_mut(owner).content.push(child);
        self
    }

    /// Set any property value
    pub fn property(&mut self, owner: NodeKey, name: impl Into<String>, value: PropertyValue) -> &mut Self {
        self.node_mut(owner).properties.push(Property {
            name: name.into(),
            value,
        });
        self
    }

    /// Finish the tree
    pub fn build(self) -> DeclarativeTree {
        DeclarativeTree {
            root: NodeKey(0),
            nodes: self.nodes,
        }
    }

    // Keys are only handed out by this builder, so they always index `nodes`.
    fn node_mut(&mut self, key: NodeKey) -> &mut DeclarativeNode {
        &mut self.nodes[key.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_allocates_sequential_keys() {
        let mut builder = TreeBuilder::new("core.Application");
        let service = builder.node_with_id("HTTPService", "service");
        let parser = builder.node("JSONInputParser");
        builder
            .children(builder.root(), "beads", vec![service])
            .child(service, "inputParser", parser);
        let tree = builder.build();

        assert_eq!(tree.root, NodeKey(0));
        assert_eq!(service, NodeKey(1));
        assert_eq!(parser, NodeKey(2));
        assert_eq!(tree.get(service).and_then(|n| n.id.as_deref()), Some("service"));
        let children: Vec<_> = tree.get(service).unwrap().child_keys().collect();
        assert_eq!(children, vec![parser]);
    }

    #[test]
    fn test_reachable_skips_orphans_and_cycles() {
        let mut builder = TreeBuilder::new("core.View");
        let group = builder.node("ui.Group");
        let label = builder.node("ui.Label");
        let orphan = builder.node("ui.Orphan");
        builder
            .child(builder.root(), "body", group)
            .content(group, label)
            .content(label, group)
            .content(orphan, label);
        let tree = builder.build();

        let keys: Vec<NodeKey> = tree.reachable().iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![tree.root, group, label]);
    }

    #[test]
    fn test_property_value_json_shape() {
        let value: PropertyValue = serde_json::from_str(r#"{"kind": "nodes", "value": [1, 2]}"#).unwrap();
        assert_eq!(value, PropertyValue::Nodes(vec![NodeKey(1), NodeKey(2)]));
        assert!(value.is_composite());

        let value: PropertyValue = serde_json::from_str(r#"{"kind": "literal", "value": 5}"#).unwrap();
        assert_eq!(value, PropertyValue::Literal(Literal::Int(5)));
        assert!(!value.is_composite());
    }
}
