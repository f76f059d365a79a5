//! Class declarations

use serde::{Deserialize, Serialize};

use super::declarative::{DeclarativeTree, NodeKey};
use super::expr::{Expr, Stmt};
use super::types::{QualifiedName, SourceLocation, SymbolKind, TypeRef, Visibility};

/// A class or interface declaration with everything codegen needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassNode {
    /// Fully qualified name
    pub name: QualifiedName,
    /// Class or interface
    #[serde(default)]
    pub kind: SymbolKind,
    /// Declared visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Base class (interfaces list their parents in `interfaces`)
    #[serde(default)]
    pub base: Option<QualifiedName>,
    /// Implemented (classes) or extended (interfaces) interfaces
    #[serde(default)]
    pub interfaces: Vec<QualifiedName>,
    /// Plain fields
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Storage-backed accessor properties
    #[serde(default)]
    pub accessors: Vec<AccessorSpec>,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
    /// Inline event bindings of the declarative tree, in declaration order
    #[serde(default)]
    pub events: Vec<EventBindingSpec>,
    /// Declarative object tree (markup classes only)
    #[serde(default)]
    pub declarative: Option<DeclarativeTree>,
    /// Metadata flags
    #[serde(default)]
    pub metadata: ClassMetadata,
    /// Declaration site
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl ClassNode {
    /// Create an empty public class
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Class,
            visibility: Visibility::Public,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            accessors: Vec::new(),
            methods: Vec::new(),
            events: Vec::new(),
            declarative: None,
            metadata: ClassMetadata::default(),
            location: None,
        }
    }

    /// Create an empty interface
    pub fn interface(name: impl Into<QualifiedName>) -> Self {
        Self {
            kind: SymbolKind::Interface,
            ..Self::new(name)
        }
    }

    /// Set the base class
    pub fn extends(mut self, base: impl Into<QualifiedName>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: impl Into<QualifiedName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add an accessor property
    pub fn with_accessor(mut self, accessor: AccessorSpec) -> Self {
        self.accessors.push(accessor);
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Add an event binding
    pub fn with_event(mut self, event: EventBindingSpec) -> Self {
        self.events.push(event);
        self
    }

    /// Attach a declarative tree
    pub fn with_declarative(mut self, tree: DeclarativeTree) -> Self {
        self.declarative = Some(tree);
        self
    }

    /// Whether any accessor setter of this class dispatches change events
    pub fn has_bindable_members(&self) -> bool {
        self.accessors.iter().any(|a| a.bindable)
            || self
                .declarative
                .as_ref()
                .is_some_and(|tree| tree.reachable().iter().any(|n| n.id.is_some()))
    }
}

/// Extra `CLASS_INFO` name record (facades, interface annotations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAlias {
    /// Simple name
    pub name: String,
    /// Qualified name
    pub qualified: QualifiedName,
    /// Kind reported for the alias
    #[serde(default)]
    pub kind: SymbolKind,
}

/// Per-class metadata flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    /// Emit a populated reflection descriptor
    #[serde(default = "default_true")]
    pub reflectable: bool,
    /// Additional `CLASS_INFO` names after the class's own entry
    #[serde(default)]
    pub aliases: Vec<ClassAlias>,
}

fn default_true() -> bool {
    true
}

impl Default for ClassMetadata {
    fn default() -> Self {
        Self {
            reflectable: true,
            aliases: Vec::new(),
        }
    }
}

/// A plain field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Class-level (static) field
    #[serde(default)]
    pub is_static: bool,
    /// Initializer expression
    #[serde(default)]
    pub initializer: Option<Expr>,
}

impl FieldSpec {
    /// Public instance field without initializer
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            visibility: Visibility::Public,
            is_static: false,
            initializer: None,
        }
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set initializer
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }

    /// Mark static
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A storage-backed accessor property (`get_<name>` / `set_<name>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorSpec {
    /// Property name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Setter dispatches a change notification
    #[serde(default)]
    pub bindable: bool,
    /// Visibility of the accessor pair
    #[serde(default)]
    pub visibility: Visibility,
    /// Initial value of the backing storage
    #[serde(default)]
    pub initializer: Option<Expr>,
}

impl AccessorSpec {
    /// Public accessor
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            bindable: false,
            visibility: Visibility::Public,
            initializer: None,
        }
    }

    /// Public bindable accessor
    pub fn bindable(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            bindable: true,
            ..Self::new(name, ty)
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A declared method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Method name
    pub name: String,
    /// Parameters
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Return type
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Class-level (static) method
    #[serde(default)]
    pub is_static: bool,
    /// Body statements
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// Declaration site
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl MethodSpec {
    /// Public instance method returning `void`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: TypeRef::void(),
            visibility: Visibility::Public,
            is_static: false,
            body: Vec::new(),
            location: None,
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: impl Into<TypeRef>) -> Self {
        self.return_type = ty.into();
        self
    }

    /// Append a body statement
    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
}

/// An inline event binding on a declarative node (`initialize="…"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBindingSpec {
    /// Node the listener attaches to
    pub node: NodeKey,
    /// Event name
    pub event: String,
    /// Declared type of the handler's `event` parameter
    #[serde(default)]
    pub event_type: Option<TypeRef>,
    /// Handler body
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// Binding site
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl EventBindingSpec {
    /// Binding with an empty body
    pub fn new(node: NodeKey, event: impl Into<String>) -> Self {
        Self {
            node,
            event: event.into(),
            event_type: None,
            body: Vec::new(),
            location: None,
        }
    }

    /// Set the handler parameter type
    pub fn with_event_type(mut self, ty: impl Into<TypeRef>) -> Self {
        self.event_type = Some(ty.into());
        self
    }

    /// Append a body statement
    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }
}
