//! Shared fixtures for integration tests

#![allow(dead_code)]

use kestrel_codegen::{
    AccessorSpec, ClassNode, CompileOutput, Compiler, EmitOptions, EventBindingSpec, Expr,
    ModuleIr, NodeKey, OutputUnit, Program, SourceSymbol, Stmt, TreeBuilder,
};

/// Library classes the application builds on
pub fn app_externs() -> Vec<SourceSymbol> {
    vec![
        SourceSymbol::class("core.Application").dispatching_events(),
        SourceSymbol::class("HTTPService"),
        SourceSymbol::class("MyModel"),
    ]
}

/// `App extends core.Application` with a bindable `model` accessor, a
/// `beads` list holding one `HTTPService` with id `service`, and an
/// `initialize` handler on the root
pub fn app_class() -> ClassNode {
    let mut tree = TreeBuilder::new("core.Application");
    let root = tree.root();
    let service = tree.node_with_id("HTTPService", "service");
    tree.children(root, "beads", vec![service]);

    let init = EventBindingSpec::new(NodeKey(0), "initialize")
        .with_event_type("core.Application")
        .stmt(Stmt::expr(Expr::assign(
            Expr::accessor(Expr::This, "model"),
            Expr::new_instance("MyModel", Vec::new()),
        )));

    ClassNode::new("App")
        .extends("core.Application")
        .with_accessor(AccessorSpec::bindable("model", "MyModel"))
        .with_event(init)
        .with_declarative(tree.build())
}

pub fn app_program() -> Program {
    let mut program = Program::new();
    for symbol in app_externs() {
        program = program.with_extern(symbol);
    }
    program.with_module(ModuleIr::single(app_class()))
}

pub fn compile(program: &Program, options: EmitOptions) -> CompileOutput {
    match Compiler::new(options).compile(program) {
        Ok(output) => output,
        Err(errors) => panic!("compilation failed: {:#?}", errors.errors),
    }
}

pub fn unit<'a>(output: &'a CompileOutput, provide: &str) -> &'a OutputUnit {
    output
        .units
        .iter()
        .find(|u| u.provide == provide)
        .unwrap_or_else(|| panic!("no unit provides {}", provide))
}
