//! Accessor pairs

use rustc_hash::FxHashSet;

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{ClassNode, Expr, TypeRef, Visibility};
use crate::linearize::Linearized;
use crate::options::EmitOptions;
use crate::symbols::{getter_name, private_member_name, setter_name, storage_name};

/// Where an accessor pair comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorOrigin {
    /// Declared on the class
    Declared,
    /// Synthesized for an exposed identity binding
    Binding,
}

/// A change notification `(instance, property, old, new)`
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeNotification<V> {
    pub property: String,
    pub old: V,
    pub new: V,
}

/// What one setter call does
#[derive(Debug, Clone, PartialEq)]
pub enum SetOutcome<V> {
    /// Value equal to the stored one, nothing happens
    Unchanged,
    /// Value stored, with at most one notification
    Stored {
        value: V,
        notification: Option<ChangeNotification<V>>,
    },
}

impl<V> SetOutcome<V> {
    /// Number of notifications dispatched
    pub fn notifications(&self) -> usize {
        match self {
            SetOutcome::Stored {
                notification: Some(_),
                ..
            } => 1,
            _ => 0,
        }
    }
}

/// Setter semantics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetterPlan {
    /// Property reported in notifications
    pub property: String,
    /// Compare, store and notify (otherwise store only)
    pub bindable: bool,
}

impl SetterPlan {
    /// Behavior of the emitted setter given the stored and incoming values
    pub fn apply<V: PartialEq + Clone>(&self, stored: &V, incoming: V) -> SetOutcome<V> {
        if !self.bindable {
            return SetOutcome::Stored {
                value: incoming,
                notification: None,
            };
        }
        if *stored == incoming {
            return SetOutcome::Unchanged;
        }
        SetOutcome::Stored {
            value: incoming.clone(),
            notification: Some(ChangeNotification {
                property: self.property.clone(),
                old: stored.clone(),
                new: incoming,
            }),
        }
    }
}

/// One getter/setter pair
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorPlan {
    /// Property name
    pub property: String,
    /// Getter member (`get_<property>`)
    pub getter: String,
    /// Setter member (`set_<property>`)
    pub setter: String,
    /// Instance field holding the value
    pub storage: String,
    /// Declared type
    pub ty: TypeRef,
    /// Visibility of the pair
    pub visibility: Visibility,
    /// Initial storage value
    pub initializer: Option<Expr>,
    /// Setter semantics
    pub setter_plan: SetterPlan,
    /// Declared or synthesized
    pub origin: AccessorOrigin,
}

impl AccessorPlan {
    /// Whether the setter dispatches change notifications
    pub fn is_bindable(&self) -> bool {
        self.setter_plan.bindable
    }
}

/// Plan the accessor pairs of a class: declared accessors in declaration
/// order, then exposed identity bindings in assignment order
pub fn plan_accessors(
    class: &ClassNode,
    linearized: Option<&Linearized>,
    options: &EmitOptions,
) -> CodegenResult<Vec<AccessorPlan>> {
    let mut plans = Vec::new();

    for accessor in &class.accessors {
        let storage = if accessor.visibility == Visibility::Private
            && options.allow_private_name_conflicts
        {
            private_member_name(&class.name, &storage_name(&accessor.name))
        } else {
            storage_name(&accessor.name)
        };
        plans.push(AccessorPlan {
            property: accessor.name.clone(),
            getter: getter_name(&accessor.name),
            setter: setter_name(&accessor.name),
            storage,
            ty: accessor.ty.clone(),
            visibility: accessor.visibility,
            initializer: accessor.initializer.clone(),
            setter_plan: SetterPlan {
                property: accessor.name.clone(),
                bindable: accessor.bindable,
            },
            origin: AccessorOrigin::Declared,
        });
    }

    let Some(linearized) = linearized else {
        return Ok(plans);
    };

    let exposed: Vec<_> = linearized.bindings.iter().filter(|b| b.exposed).collect();

    // Declared members plus every name the generated accessor pairs occupy
    let mut members: FxHashSet<String> = FxHashSet::default();
    members.extend(class.fields.iter().map(|f| f.name.clone()));
    members.extend(class.accessors.iter().map(|a| a.name.clone()));
    members.extend(class.methods.iter().map(|m| m.name.clone()));
    for plan in &plans {
        members.insert(plan.getter.clone());
        members.insert(plan.setter.clone());
        members.insert(plan.storage.clone());
    }
    for binding in &exposed {
        members.insert(getter_name(&binding.name));
        members.insert(setter_name(&binding.name));
    }

    for binding in exposed {
        if members.contains(&binding.name) {
            return Err(CodegenError::DuplicateIdentityBinding {
                class: class.name.clone(),
                name: binding.name.clone(),
                location: class.location.clone(),
            });
        }
        plans.push(AccessorPlan {
            property: binding.name.clone(),
            getter: getter_name(&binding.name),
            setter: setter_name(&binding.name),
            storage: binding.name.clone(),
            ty: TypeRef::Class(binding.target.clone()),
            visibility: Visibility::Public,
            initializer: None,
            setter_plan: SetterPlan {
                property: binding.name.clone(),
                bindable: true,
            },
            origin: AccessorOrigin::Binding,
        });
    }

    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AccessorSpec, FieldSpec, TreeBuilder};
    use crate::linearize::Linearizer;

    #[test]
    fn test_bindable_setter_is_idempotent() {
        let plan = SetterPlan {
            property: "model".into(),
            bindable: true,
        };
        assert_eq!(plan.apply(&3, 3), SetOutcome::Unchanged);

        let outcome = plan.apply(&3, 4);
        assert_eq!(outcome.notifications(), 1);
        assert_eq!(
            outcome,
            SetOutcome::Stored {
                value: 4,
                notification: Some(ChangeNotification {
                    property: "model".into(),
                    old: 3,
                    new: 4
                })
            }
        );
    }

    #[test]
    fn test_plain_setter_always_stores() {
        let plan = SetterPlan {
            property: "width".into(),
            bindable: false,
        };
        let outcome = plan.apply(&"a", "a");
        assert_eq!(outcome.notifications(), 0);
        assert!(matches!(outcome, SetOutcome::Stored { value: "a", .. }));
    }

    #[test]
    fn test_declared_then_exposed_order() {
        let mut tree = TreeBuilder::new("core.Application");
        let service = tree.node_with_id("HTTPService", "service");
        let parser = tree.node("JSONInputParser");
        tree.children(tree.root(), "beads", vec![service])
            .child(service, "parser", parser);
        let class = ClassNode::new("App")
            .with_accessor(AccessorSpec::bindable("model", "MyModel"))
            .with_declarative(tree.build());
        let linearized = Linearizer::new(&class.name)
            .linearize(class.declarative.as_ref().unwrap())
            .unwrap();

        let plans = plan_accessors(&class, Some(&linearized), &EmitOptions::default()).unwrap();
        let summary: Vec<(&str, &str, AccessorOrigin)> = plans
            .iter()
            .map(|p| (p.property.as_str(), p.storage.as_str(), p.origin))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("model", "model_", AccessorOrigin::Declared),
                ("service", "service", AccessorOrigin::Binding),
            ]
        );
        assert!(plans.iter().all(AccessorPlan::is_bindable));
        assert_eq!(plans[1].getter, "get_service");
    }

    #[test]
    fn test_exposed_binding_colliding_with_generated_accessor() {
        let mut tree = TreeBuilder::new("core.Application");
        let label = tree.node_with_id("ui.Label", "label");
        let getter = tree.node_with_id("ui.Label", "get_label");
        tree.children(tree.root(), "items", vec![label, getter]);
        let class = ClassNode::new("App").with_declarative(tree.build());
        let linearized = Linearizer::new(&class.name)
            .linearize(class.declarative.as_ref().unwrap())
            .unwrap();
        let err = plan_accessors(&class, Some(&linearized), &EmitOptions::default()).unwrap_err();
        assert!(
            matches!(&err, CodegenError::DuplicateIdentityBinding { name, .. } if name == "get_label"),
            "{:?}",
            err
        );

        let mut tree = TreeBuilder::new("core.Application");
        let setter = tree.node_with_id("ui.Label", "set_model");
        tree.child(tree.root(), "item", setter);
        let class = ClassNode::new("App")
            .with_accessor(AccessorSpec::bindable("model", "MyModel"))
            .with_declarative(tree.build());
        let linearized = Linearizer::new(&class.name)
            .linearize(class.declarative.as_ref().unwrap())
            .unwrap();
        let err = plan_accessors(&class, Some(&linearized), &EmitOptions::default()).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateIdentityBinding { .. }));
    }

    #[test]
    fn test_exposed_binding_colliding_with_member() {
        let mut tree = TreeBuilder::new("core.Application");
        let service = tree.node_with_id("HTTPService", "service");
        tree.child(tree.root(), "bead", service);
        let class = ClassNode::new("App")
            .with_field(FieldSpec::new("service", "String"))
            .with_declarative(tree.build());
        let linearized = Linearizer::new(&class.name)
            .linearize(class.declarative.as_ref().unwrap())
            .unwrap();

        let err = plan_accessors(&class, Some(&linearized), &EmitOptions::default()).unwrap_err();
        assert!(matches!(err, CodegenError::DuplicateIdentityBinding { .. }));
    }

    #[test]
    fn test_private_storage_mangled_when_enabled() {
        let mut accessor = AccessorSpec::new("count", "int");
        accessor.visibility = Visibility::Private;
        let class = ClassNode::new("pkg.Counter").with_accessor(accessor);
        let options = EmitOptions {
            allow_private_name_conflicts: true,
            ..EmitOptions::default()
        };
        let plans = plan_accessors(&class, None, &options).unwrap();
        assert_eq!(plans[0].storage, "pkg_Counter_count_");
    }
}
