//! Declarative tree linearization
//!
//! Turns a class's declarative object tree into one [`Instruction`] per node,
//! nested the way the tree is, ready to be encoded for the runtime's generic
//! graph builder. Along the way it:
//!
//! - assigns identity bindings: source-given names are kept and exposed,
//!   every other non-root node gets a synthesized `$ID<n>` in pre-order,
//! - reorders properties so simple values precede nested nodes,
//! - attaches each event binding to the listener slots of its node,
//! - rejects malformed trees (back-edges, shared or dangling nodes, nesting
//!   past [`MAX_NESTING_DEPTH`]).

mod decode;
mod instruction;

pub use decode::{decode_node, decode_root, DecodeError, DecodedNode, DecodedValue};
pub use instruction::{
    Encoded, IdentityBinding, Instruction, InstructionProperty, InstructionValue, Listener,
    EXPOSED_ID_PROPERTY, ROOT_CONTENT_PROPERTY, SYNTHETIC_ID_PROPERTY,
};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{
    DeclarativeNode, DeclarativeTree, EventBindingSpec, NodeKey, PropertyValue, QualifiedName,
    SourceLocation,
};
use crate::symbols::{binding_name, handler_name, is_synthetic_binding, is_synthetic_handler};

/// Deepest node nesting a tree may have, counting the root as depth 0
pub const MAX_NESTING_DEPTH: usize = 512;

/// A field the graph builder assigns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingField {
    /// Field name
    pub name: String,
    /// Type of the assigned instance
    pub target: QualifiedName,
    /// Source-given, gets a public accessor pair
    pub exposed: bool,
    /// Node the binding belongs to
    pub node: NodeKey,
}

/// A synthesized event handler slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSlot {
    /// Handler name (`$EH<n>`)
    pub name: String,
    /// Index into the class's event bindings
    pub binding: usize,
    /// Node whose listener slot holds the handler
    pub node: NodeKey,
}

/// Result of linearizing one class's tree
#[derive(Debug, Clone, PartialEq)]
pub struct Linearized {
    /// Root instruction
    pub root: Instruction,
    /// Binding fields in assignment (pre-order) order
    pub bindings: Vec<BindingField>,
    /// Handler slots in event declaration order
    pub handlers: Vec<HandlerSlot>,
}

impl Linearized {
    /// Number of instructions in the tree
    pub fn instruction_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&mut |_| count += 1);
        count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Linearizer for one class
pub struct Linearizer<'a> {
    class: &'a QualifiedName,
    location: Option<&'a SourceLocation>,
    events: &'a [EventBindingSpec],
}

impl<'a> Linearizer<'a> {
    /// Linearizer for the tree of `class`
    pub fn new(class: &'a QualifiedName) -> Self {
        Self {
            class,
            location: None,
            events: &[],
        }
    }

    /// Event bindings to attach
    pub fn with_events(mut self, events: &'a [EventBindingSpec]) -> Self {
        self.events = events;
        self
    }

    /// Fallback location for errors on nodes without one
    pub fn with_location(mut self, location: Option<&'a SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Linearize a tree
    pub fn linearize(&self, tree: &DeclarativeTree) -> CodegenResult<Linearized> {
        let mut nodes: FxHashMap<NodeKey, &DeclarativeNode> = FxHashMap::default();
        for node in &tree.nodes {
            if nodes.insert(node.key, node).is_some() {
                return Err(self.malformed(format!("node key {} is used twice", node.key), node));
            }
        }

        let root = match nodes.get(&tree.root) {
            Some(root) => *root,
            None => {
                return Err(CodegenError::DanglingNodeReference {
                    class: self.class.clone(),
                    node: tree.root,
                    location: self.location.cloned(),
                })
            }
        };
        if root.id.is_some() {
            return Err(self.malformed("the root node cannot carry an identity binding".into(), root));
        }

        let mut handlers = Vec::with_capacity(self.events.len());
        let mut listeners: FxHashMap<NodeKey, Vec<Listener>> = FxHashMap::default();
        for (index, event) in self.events.iter().enumerate() {
            if !nodes.contains_key(&event.node) {
                return Err(self.unknown_event_target(event));
            }
            let name = handler_name(index);
            listeners.entry(event.node).or_default().push(Listener {
                event: event.event.clone(),
                handler: name.clone(),
            });
            handlers.push(HandlerSlot {
                name,
                binding: index,
                node: event.node,
            });
        }

        let mut walk = Walk {
            linearizer: self,
            nodes,
            state: FxHashMap::default(),
            listeners,
            bindings: Vec::new(),
            source_ids: FxHashSet::default(),
            next_id: 0,
            depth: 0,
        };
        let root = walk.visit(root, true)?;

        // Every listener must have been picked up by a reached node
        if let Some(event) = self
            .events
            .iter()
            .find(|e| !walk.state.contains_key(&e.node))
        {
            return Err(self.unknown_event_target(event));
        }

        Ok(Linearized {
            root,
            bindings: walk.bindings,
            handlers,
        })
    }

    fn malformed(&self, reason: String, node: &DeclarativeNode) -> CodegenError {
        CodegenError::MalformedDeclarativeTree {
            class: self.class.clone(),
            reason,
            location: node.location.clone().or_else(|| self.location.cloned()),
        }
    }

    fn unknown_event_target(&self, event: &EventBindingSpec) -> CodegenError {
        CodegenError::UnknownEventTarget {
            class: self.class.clone(),
            event: event.event.clone(),
            node: event.node,
            location: event.location.clone().or_else(|| self.location.cloned()),
        }
    }
}

struct Walk<'l, 't> {
    linearizer: &'l Linearizer<'l>,
    nodes: FxHashMap<NodeKey, &'t DeclarativeNode>,
    state: FxHashMap<NodeKey, Visit>,
    listeners: FxHashMap<NodeKey, Vec<Listener>>,
    bindings: Vec<BindingField>,
    source_ids: FxHashSet<String>,
    next_id: usize,
    depth: usize,
}

impl<'l, 't> Walk<'l, 't> {
    fn child(&mut self, parent: &DeclarativeNode, key: NodeKey) -> CodegenResult<Instruction> {
        let class = self.linearizer.class;
        let node = match self.nodes.get(&key) {
            Some(node) => *node,
            None => {
                return Err(CodegenError::DanglingNodeReference {
                    class: class.clone(),
                    node: key,
                    location: self.location_of(parent),
                })
            }
        };
        match self.state.get(&key).copied() {
            Some(Visit::InProgress) => Err(CodegenError::CyclicDeclarativeTree {
                class: class.clone(),
                node: key,
                target: node.target.clone(),
                location: self.location_of(parent),
            }),
            Some(Visit::Done) => Err(CodegenError::SharedDeclarativeNode {
                class: class.clone(),
                node: key,
                target: node.target.clone(),
                location: self.location_of(parent),
            }),
            None => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.linearizer.malformed(
                        format!("nodes are nested deeper than {} levels", MAX_NESTING_DEPTH),
                        node,
                    ));
                }
                self.depth += 1;
                let instruction = self.visit(node, false);
                self.depth -= 1;
                instruction
            }
        }
    }

    fn location_of(&self, node: &DeclarativeNode) -> Option<SourceLocation> {
        node.location
            .clone()
            .or_else(|| self.linearizer.location.cloned())
    }

    fn visit(&mut self, node: &'t DeclarativeNode, is_root: bool) -> CodegenResult<Instruction> {
        self.state.insert(node.key, Visit::InProgress);

        // Bindings are numbered before any child is visited
        let binding = if is_root {
            None
        } else {
            Some(self.bind(node)?)
        };

        let mut simple = Vec::new();
        let mut composite = Vec::new();
        let mut content_keys: &[NodeKey] = &node.content;
        for property in &node.properties {
            if property.name == EXPOSED_ID_PROPERTY || property.name == SYNTHETIC_ID_PROPERTY {
                return Err(self.linearizer.malformed(
                    format!("property '{}' is reserved for identity bindings", property.name),
                    node,
                ));
            }
            if is_root && property.name == ROOT_CONTENT_PROPERTY && !node.content.is_empty() {
                return Err(self.linearizer.malformed(
                    format!("property '{}' conflicts with default content", property.name),
                    node,
                ));
            }
            // An explicit root content sequence is the same as default content
            if is_root && property.name == ROOT_CONTENT_PROPERTY {
                if let PropertyValue::Nodes(keys) = &property.value {
                    content_keys = keys;
                    continue;
                }
            }
            let value = match &property.value {
                PropertyValue::Literal(value) => InstructionValue::Literal(value.clone()),
                PropertyValue::Expression(expr) => InstructionValue::Expression(expr.clone()),
                PropertyValue::Node(key) => InstructionValue::Node(Box::new(self.child(node, *key)?)),
                PropertyValue::Nodes(keys) => {
                    let mut children = Vec::with_capacity(keys.len());
                    for key in keys {
                        children.push(self.child(node, *key)?);
                    }
                    InstructionValue::Nodes(children)
                }
            };
            let property = InstructionProperty {
                name: property.name.clone(),
                value,
            };
            if property.value.is_composite() {
                composite.push(property);
            } else {
                simple.push(property);
            }
        }
        simple.extend(composite);

        let mut content = Vec::with_capacity(content_keys.len());
        for key in content_keys {
            content.push(self.child(node, *key)?);
        }

        self.state.insert(node.key, Visit::Done);
        Ok(Instruction {
            node: node.key,
            target: node.target.clone(),
            binding,
            properties: simple,
            styles: node.styles.clone(),
            listeners: self.listeners.remove(&node.key).unwrap_or_default(),
            content,
        })
    }

    fn bind(&mut self, node: &DeclarativeNode) -> CodegenResult<IdentityBinding> {
        let binding = match &node.id {
            Some(id) => {
                if is_synthetic_binding(id) || is_synthetic_handler(id) || !self.source_ids.insert(id.clone()) {
                    return Err(CodegenError::DuplicateIdentityBinding {
                        class: self.linearizer.class.clone(),
                        name: id.clone(),
                        location: self.location_of(node),
                    });
                }
                IdentityBinding {
                    name: id.clone(),
                    exposed: true,
                }
            }
            None => {
                let name = binding_name(self.next_id);
                self.next_id += 1;
                IdentityBinding {
                    name,
                    exposed: false,
                }
            }
        };
        self.bindings.push(BindingField {
            name: binding.name.clone(),
            target: node.target.clone(),
            exposed: binding.exposed,
            node: node.key,
        });
        Ok(binding)
    }
}
