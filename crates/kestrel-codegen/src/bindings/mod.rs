//! Accessor and event binding synthesis
//!
//! Plans, per class, the accessor pairs and event handlers the class emitter
//! writes:
//!
//! - one [`AccessorPlan`] per declared accessor and per exposed identity
//!   binding, with a [`SetterPlan`] describing the setter's change policy,
//! - one [`HandlerPlan`] per inline event binding, named by declaration order.

mod accessors;
mod events;

pub use accessors::{
    plan_accessors, AccessorOrigin, AccessorPlan, ChangeNotification, SetOutcome, SetterPlan,
};
pub use events::{plan_handlers, HandlerPlan, EVENT_PARAM};
