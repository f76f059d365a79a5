//! Expressions and statements
//!
//! Only the forms that reach the code generator after type checking:
//! member access is already classified (plain field vs accessor), casts carry
//! their resolved target type, and class references are fully qualified.

use serde::{Deserialize, Serialize};

use super::types::{Literal, QualifiedName, TypeRef};

/// A typed expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    /// Literal value
    Literal {
        /// The value
        value: Literal,
    },
    /// The enclosing instance
    This,
    /// A local variable or parameter
    Local {
        /// Variable name
        name: String,
    },
    /// Instance member access (`object.name`)
    Member {
        /// Receiver
        object: Box<Expr>,
        /// Member name
        name: String,
        /// Member is an accessor property (lowered to `get_`/`set_` calls)
        #[serde(default)]
        accessor: bool,
    },
    /// Static member access (`Class.name`)
    StaticMember {
        /// Owning type
        class: TypeRef,
        /// Member name
        name: String,
    },
    /// Function or method call
    Call {
        /// Callee expression
        callee: Box<Expr>,
        /// Arguments
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Instantiation
    New {
        /// Instantiated type
        class: TypeRef,
        /// Constructor arguments
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// A type used as a value
    ClassRef {
        /// Referenced type
        class: TypeRef,
    },
    /// Checked downcast (`value as Type`)
    Cast {
        /// Operand
        value: Box<Expr>,
        /// Target type
        to: TypeRef,
    },
    /// Assignment
    Assign {
        /// Assignment target
        target: Box<Expr>,
        /// Assigned value
        value: Box<Expr>,
    },
    /// Binary operation
    Binary {
        /// Operator token (`+`, `==`, `&&`, …)
        op: String,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
    /// Array literal
    Array {
        /// Elements
        #[serde(default)]
        items: Vec<Expr>,
    },
}

impl Expr {
    /// Literal expression
    pub fn literal(value: Literal) -> Self {
        Expr::Literal { value }
    }

    /// Local variable reference
    pub fn local(name: impl Into<String>) -> Self {
        Expr::Local { name: name.into() }
    }

    /// Plain member access
    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            name: name.into(),
            accessor: false,
        }
    }

    /// Static member access
    pub fn static_member(class: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Expr::StaticMember {
            class: class.into(),
            name: name.into(),
        }
    }

    /// Accessor property access
    pub fn accessor(object: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            name: name.into(),
            accessor: true,
        }
    }

    /// Call expression
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// Cast expression
    pub fn cast(value: Expr, to: impl Into<TypeRef>) -> Self {
        Expr::Cast {
            value: Box::new(value),
            to: to.into(),
        }
    }

    /// Assignment expression
    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Instantiation expression
    pub fn new_instance(class: impl Into<TypeRef>, args: Vec<Expr>) -> Self {
        Expr::New {
            class: class.into(),
            args,
        }
    }

    /// Visit every class referenced by this expression, in evaluation order
    pub fn visit_class_refs(&self, f: &mut dyn FnMut(&QualifiedName)) {
        match self {
            Expr::Literal { .. } | Expr::This | Expr::Local { .. } => {}
            Expr::Member { object, .. } => object.visit_class_refs(f),
            Expr::StaticMember { class, .. } | Expr::ClassRef { class } => {
                if let Some(name) = class.as_class() {
                    f(name);
                }
            }
            Expr::Call { callee, args } => {
                callee.visit_class_refs(f);
                for arg in args {
                    arg.visit_class_refs(f);
                }
            }
            Expr::New { class, args } => {
                if let Some(name) = class.as_class() {
                    f(name);
                }
                for arg in args {
                    arg.visit_class_refs(f);
                }
            }
            Expr::Cast { value, to } => {
                value.visit_class_refs(f);
                if let Some(name) = to.as_class() {
                    f(name);
                }
            }
            Expr::Assign { target, value } => {
                target.visit_class_refs(f);
                value.visit_class_refs(f);
            }
            Expr::Binary { left, right, .. } => {
                left.visit_class_refs(f);
                right.visit_class_refs(f);
            }
            Expr::Array { items } => {
                for item in items {
                    item.visit_class_refs(f);
                }
            }
        }
    }

    /// Whether a cast appears anywhere in this expression
    pub fn contains_cast(&self) -> bool {
        match self {
            Expr::Literal { .. }
            | Expr::This
            | Expr::Local { .. }
            | Expr::StaticMember { .. }
            | Expr::ClassRef { .. } => false,
            Expr::Cast { .. } => true,
            Expr::Member { object, .. } => object.contains_cast(),
            Expr::Call { callee, args } => {
                callee.contains_cast() || args.iter().any(Expr::contains_cast)
            }
            Expr::New { args, .. } => args.iter().any(Expr::contains_cast),
            Expr::Assign { target, value } => target.contains_cast() || value.contains_cast(),
            Expr::Binary { left, right, .. } => left.contains_cast() || right.contains_cast(),
            Expr::Array { items } => items.iter().any(Expr::contains_cast),
        }
    }
}

/// A statement inside a method or event handler body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// Expression statement
    Expr {
        /// The expression
        expr: Expr,
    },
    /// Local variable declaration
    Var {
        /// Variable name
        name: String,
        /// Optional initializer
        #[serde(default)]
        init: Option<Expr>,
    },
    /// Return statement
    Return {
        /// Returned value
        #[serde(default)]
        value: Option<Expr>,
    },
}

impl Stmt {
    /// Expression statement
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr { expr }
    }

    /// Expressions directly owned by this statement
    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        let expr = match self {
            Stmt::Expr { expr } => Some(expr),
            Stmt::Var { init, .. } => init.as_ref(),
            Stmt::Return { value } => value.as_ref(),
        };
        expr.into_iter()
    }
}
