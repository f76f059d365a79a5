//! Global symbol table
//!
//! Built in two passes so forward and cyclic references between classes
//! resolve without back-patching:
//!
//! 1. [`SymbolTableBuilder::register`] records a stub for every class,
//!    interface and extern in the program.
//! 2. [`SymbolTableBuilder::freeze`] resolves base and interface links against
//!    the complete stub set, flattens capabilities down the inheritance chain
//!    and assigns output names.
//!
//! The frozen [`SymbolTable`] is immutable and shared by reference across the
//! per-class codegen workers.

mod naming;
mod symbol;
mod table;

pub use naming::{
    binding_name, flatten, getter_name, handler_name, is_synthetic_binding, is_synthetic_handler,
    private_member_name,
    setter_name, storage_name, NameStyle, BINDING_PREFIX, HANDLER_PREFIX,
};
pub use symbol::{Capabilities, Symbol, SymbolId};
pub use table::{SymbolTable, SymbolTableBuilder};
