//! Event handlers

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{ClassNode, NodeKey, Stmt, TypeRef};
use crate::linearize::Linearized;

/// Name of the handler's single parameter
pub const EVENT_PARAM: &str = "event";

/// A synthesized handler method
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerPlan {
    /// Method name (`$EH<n>`)
    pub name: String,
    /// Event the handler listens to
    pub event: String,
    /// Node whose listener slot references the handler
    pub node: NodeKey,
    /// Declared type of the event parameter
    pub event_type: Option<TypeRef>,
    /// Handler body
    pub body: Vec<Stmt>,
}

/// One handler per event binding, in declaration order
pub fn plan_handlers(class: &ClassNode, linearized: Option<&Linearized>) -> CodegenResult<Vec<HandlerPlan>> {
    let Some(linearized) = linearized else {
        // Without a tree there is no listener slot to attach to
        return match class.events.first() {
            Some(event) => Err(CodegenError::UnknownEventTarget {
                class: class.name.clone(),
                event: event.event.clone(),
                node: event.node,
                location: event.location.clone().or_else(|| class.location.clone()),
            }),
            None => Ok(Vec::new()),
        };
    };

    let mut plans = Vec::with_capacity(linearized.handlers.len());
    for slot in &linearized.handlers {
        let Some(binding) = class.events.get(slot.binding) else {
            return Err(CodegenError::Internal {
                class: class.name.clone(),
                message: format!("handler {} has no event binding", slot.name),
            });
        };
        plans.push(HandlerPlan {
            name: slot.name.clone(),
            event: binding.event.clone(),
            node: slot.node,
            event_type: binding.event_type.clone(),
            body: binding.body.clone(),
        });
    }
    Ok(plans)
}
