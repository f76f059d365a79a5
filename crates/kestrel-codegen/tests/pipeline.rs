mod common;

use kestrel_codegen::{
    CancellationToken, ClassNode, CodegenError, Compiler, EmitOptions, FieldSpec, Literal,
    ModuleIr, NameStyle, Program, SourceSymbol, TreeBuilder,
};

/// Twenty markup classes with a few nested nodes each
fn many_classes() -> Program {
    let mut program = Program::new()
        .with_extern(SourceSymbol::class("ui.Application"))
        .with_extern(SourceSymbol::class("ui.Group"))
        .with_extern(SourceSymbol::class("ui.Label"));
    for i in 0..20 {
        let mut tree = TreeBuilder::new("ui.Group");
        let root = tree.root();
        for j in 0..3 {
            let group = tree.node("ui.Group");
            let label = tree.node("ui.Label");
            tree.content(root, group)
                .content(group, label)
                .literal(label, "text", Literal::string(format!("{}-{}", i, j)));
        }
        let class = ClassNode::new(format!("views.View{}", i))
            .extends("ui.Group")
            .with_declarative(tree.build());
        program = program.with_module(ModuleIr::single(class));
    }
    program
}

#[test]
fn test_output_identical_across_worker_counts() {
    let program = many_classes();
    let serial = common::compile(&program, EmitOptions::default().with_jobs(1));
    for jobs in [2, 4, 8] {
        let parallel = common::compile(&program, EmitOptions::default().with_jobs(jobs));
        assert_eq!(serial.units, parallel.units, "jobs = {}", jobs);
    }
    assert_eq!(serial.units.len(), 20);
    assert!(serial.units[0].text.contains("'$ID5'"));
    assert!(!serial.units[0].text.contains("'$ID6'"));
}

#[test]
fn test_repeated_compilation_is_byte_identical() {
    let program = common::app_program();
    let first = common::compile(&program, EmitOptions::default());
    let second = common::compile(&program, EmitOptions::default());
    assert_eq!(first.units[0].text, second.units[0].text);
}

#[test]
fn test_collision_isolation() {
    let program = Program::new()
        .with_module(ModuleIr::single(ClassNode::new("a.Event")))
        .with_module(ModuleIr::single(ClassNode::new("b.Event").extends("a.Event")));
    let output = common::compile(&program, EmitOptions::default());

    let a = common::unit(&output, "a.Event");
    let b = common::unit(&output, "b.Event");
    assert!(a.requires.is_empty());
    assert_eq!(b.requires, vec!["a.Event"]);
    assert!(b.text.contains("goog.inherits(b.Event, a.Event);"));
    assert!(b.text.contains("{ name: 'Event', qName: 'b.Event', kind: 'class' }"));
    assert!(b.text.contains("'Event': { type: '', declaredBy: 'b.Event'}"));
}

#[test]
fn test_collision_isolation_flattened() {
    let program = Program::new()
        .with_module(ModuleIr::single(ClassNode::new("a.Event")))
        .with_module(ModuleIr::single(ClassNode::new("b.Event").extends("a.Event")));
    let output = common::compile(&program, EmitOptions::default().with_name_style(NameStyle::Flattened));

    let b = common::unit(&output, "b_Event");
    assert_eq!(b.requires, vec!["a_Event"]);
    assert!(b.text.contains("goog.inherits(b_Event, a_Event);"));
    assert!(b.text.contains("qName: 'b.Event'"));
}

fn same_simple_names() -> Program {
    Program::new()
        .with_module(ModuleIr::single(ClassNode::new("a.Event")))
        .with_module(ModuleIr::single(ClassNode::new("b.Event")))
        .with_module(ModuleIr::single(
            ClassNode::new("app.Main")
                .with_field(FieldSpec::new("first", "a.Event"))
                .with_field(FieldSpec::new("second", "b.Event")),
        ))
}

#[test]
fn test_module_requiring_both_same_named_classes() {
    let output = common::compile(&same_simple_names(), EmitOptions::default());

    let main = common::unit(&output, "app.Main");
    assert_eq!(main.requires, vec!["a.Event", "b.Event"]);
    assert!(main.text.contains("goog.require('a.Event');\ngoog.require('b.Event');\n"));
    assert!(common::unit(&output, "a.Event").text.contains("{ name: 'Event', qName: 'a.Event', kind: 'class' }"));
    assert!(common::unit(&output, "b.Event").text.contains("{ name: 'Event', qName: 'b.Event', kind: 'class' }"));
    assert!(main.text.contains("{ name: 'Main', qName: 'app.Main', kind: 'class' }"));
}

#[test]
fn test_module_requiring_both_same_named_classes_flattened() {
    let output = common::compile(
        &same_simple_names(),
        EmitOptions::default().with_name_style(NameStyle::Flattened),
    );

    let main = common::unit(&output, "app_Main");
    assert_eq!(main.requires, vec!["a_Event", "b_Event"]);
    assert!(common::unit(&output, "a_Event").text.contains("qName: 'a.Event'"));
    assert!(common::unit(&output, "b_Event").text.contains("qName: 'b.Event'"));
    assert!(main.text.contains("qName: 'app.Main'"));
}

#[test]
fn test_deeply_nested_class_fails_alone() {
    let mut tree = TreeBuilder::new("ui.Group");
    let mut parent = tree.root();
    for _ in 0..8_000 {
        let node = tree.node("ui.Group");
        tree.content(parent, node);
        parent = node;
    }
    let deep = ClassNode::new("app.Deep")
        .extends("ui.Group")
        .with_declarative(tree.build());

    let program = Program::new()
        .with_extern(SourceSymbol::class("ui.Group"))
        .with_module(ModuleIr::single(ClassNode::new("app.First")))
        .with_module(ModuleIr::single(deep))
        .with_module(ModuleIr::single(ClassNode::new("app.Last")));

    let output = Compiler::new(EmitOptions::default().with_jobs(3))
        .run(&program)
        .unwrap();
    let provides: Vec<&str> = output.units.iter().map(|u| u.provide.as_str()).collect();
    assert_eq!(provides, vec!["app.First", "app.Last"]);
    assert_eq!(output.errors.len(), 1);
    assert!(matches!(
        &output.errors[0],
        CodegenError::MalformedDeclarativeTree { class, .. } if class.as_str() == "app.Deep"
    ));
}

#[test]
fn test_failed_class_does_not_block_siblings() {
    let mut tree = TreeBuilder::new("ui.Application");
    let root = tree.root();
    let a = tree.node_with_id("ui.Label", "title");
    let b = tree.node_with_id("ui.Label", "title");
    tree.content(root, a).content(root, b);
    let broken = ClassNode::new("app.Broken").with_declarative(tree.build());

    let program = Program::new()
        .with_extern(SourceSymbol::class("ui.Application"))
        .with_extern(SourceSymbol::class("ui.Label"))
        .with_module(ModuleIr::single(ClassNode::new("app.First")))
        .with_module(ModuleIr::single(broken))
        .with_module(ModuleIr::single(ClassNode::new("app.Last")));

    let compiler = Compiler::new(EmitOptions::default().with_jobs(3));
    let output = compiler.run(&program).unwrap();
    let provides: Vec<&str> = output.units.iter().map(|u| u.provide.as_str()).collect();
    assert_eq!(provides, vec!["app.First", "app.Last"]);
    assert_eq!(output.errors.len(), 1);
    assert!(matches!(
        &output.errors[0],
        CodegenError::DuplicateIdentityBinding { class, .. } if class.as_str() == "app.Broken"
    ));

    let err = compiler.compile(&program).unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert!(err.to_string().starts_with("1 error(s) during code generation"));
}

#[test]
fn test_errors_are_reported_in_program_order() {
    let program = Program::new()
        .with_module(ModuleIr::new("app.Empty"))
        .with_module(ModuleIr::single(
            ClassNode::new("app.Uses").with_field(FieldSpec::new("x", "app.Missing")),
        ));
    let output = Compiler::new(EmitOptions::default().with_jobs(4)).run(&program).unwrap();
    assert!(output.units.is_empty());
    assert!(matches!(output.errors[0], CodegenError::EmptyModule { .. }));
    assert!(matches!(output.errors[1], CodegenError::UnresolvedSymbol { .. }));
}

#[test]
fn test_cancellation_is_reported() {
    let token = CancellationToken::new();
    let compiler = Compiler::new(EmitOptions::default()).with_cancellation(token.clone());
    token.cancel();
    let err = compiler.compile(&many_classes()).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.errors, vec![CodegenError::Cancelled]);
}
