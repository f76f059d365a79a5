//! Kestrel Code Generator
//!
//! Lowers the typed, class-based IR produced by the Kestrel front-end
//! (class declarations, declarative object trees, expressions) into modular
//! output units for the prototype-based runtime loader.
//!
//! # Pipeline
//!
//! ```text
//! Program ──► SymbolTableBuilder ──freeze──► SymbolTable      (phase 1, serial)
//!                                               │
//!              per class, in parallel:          ▼
//!              deps::collect + Linearizer + bindings + ClassEmitter (phase 2)
//!                                               │
//!              per module:                      ▼
//!              ModuleAssembler ──► OutputUnit                  (phase 3)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kestrel_codegen::{Compiler, EmitOptions, Program};
//!
//! let program = Program::from_json(&std::fs::read_to_string("app.ir.json")?)?;
//! let output = Compiler::new(EmitOptions::default()).compile(&program)?;
//! for unit in &output.units {
//!     println!("{}", unit.text);
//! }
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Input IR: classes, declarative trees, expressions
pub mod ir;

/// Global symbol table (two-pass registration and resolution)
pub mod symbols;

/// Per-class dependency collection
pub mod deps;

/// Declarative tree to builder-instruction linearization
pub mod linearize;

/// Accessor pairs and event handler synthesis
pub mod bindings;

/// Class body emission
pub mod emit;

/// Module assembly (provide/require + class bodies)
pub mod module;

/// Phase orchestration and parallel class codegen
pub mod pipeline;

/// Emission options
pub mod options;

/// Errors
pub mod error;

/// Diagnostic rendering
pub mod diagnostic;

// ============================================================================
// Re-exports
// ============================================================================

pub use diagnostic::{error_code, DiagnosticRenderer, ErrorCode};
pub use emit::{emit_class, ClassBody, ClassEmitter};
pub use error::{CodegenError, CodegenResult, CompileErrors};
pub use ir::{
    AccessorSpec, ClassNode, DeclarativeNode, DeclarativeTree, EventBindingSpec, Expr, FieldSpec,
    Literal, MethodSpec, ModuleIr, NodeKey, Program, QualifiedName, SourceLocation, SourceSymbol,
    Stmt, SymbolKind, TreeBuilder, TypeRef, Visibility,
};
pub use linearize::{Instruction, Linearized, Linearizer};
pub use module::{ModuleAssembler, OutputUnit};
pub use options::{EmitOptions, OptionsError};
pub use pipeline::{CancellationToken, CompileOutput, Compiler};
pub use symbols::{NameStyle, Symbol, SymbolId, SymbolTable, SymbolTableBuilder};
