//! Class body emission
//!
//! [`ClassEmitter`] runs the per-class stages (dependency collection,
//! linearization, accessor and handler planning) and renders the class body
//! text in the loader's fixed member order.

mod class;
mod expr;
mod metadata;
mod writer;

pub use class::{emit_class, ClassBody, ClassEmitter};
pub use expr::{quote, render_literal, ExprEmitter};
pub use metadata::{Access, ClassInfo, MemberInfo, NameRecord, ReflectionInfo};
pub use writer::CodeWriter;
