use kestrel_codegen::{
    ClassNode, CodegenError, ModuleIr, NameStyle, Program, QualifiedName, SourceSymbol,
    SymbolTable, SymbolTableBuilder,
};

fn two_events() -> Program {
    Program::new()
        .with_module(ModuleIr::single(ClassNode::new("a.Event")))
        .with_module(ModuleIr::single(ClassNode::new("b.Event").extends("a.Event")))
}

#[test]
fn test_same_simple_name_in_two_packages() {
    let table = SymbolTable::from_program(&two_events(), NameStyle::Dotted).unwrap();

    let a = table.lookup(&"a.Event".into()).unwrap();
    let b = table.lookup(&"b.Event".into()).unwrap();
    assert_ne!(a, b);
    assert_eq!(table.get(a).output_name, "a.Event");
    assert_eq!(table.get(b).output_name, "b.Event");
    assert_eq!(table.get(b).base, Some(a));
    assert_eq!(table.symbols_named("Event").len(), 2);
}

#[test]
fn test_flattened_names_stay_unique() {
    let program = Program::new()
        .with_extern(SourceSymbol::class("a_b.C"))
        .with_extern(SourceSymbol::class("a.b_C"))
        .with_extern(SourceSymbol::class("a.b.C"));
    let table = SymbolTable::from_program(&program, NameStyle::Flattened).unwrap();

    let mut names: Vec<&str> = table.iter().map(|s| s.output_name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a_b_C", "a_b_C$1", "a_b_C$2"]);
    assert_eq!(table.output_name(&"a.b.C".into()), Some("a_b_C"));
    assert_eq!(table.output_name(&"a.b_C".into()), Some("a_b_C$1"));
    assert_eq!(table.output_name(&"a_b.C".into()), Some("a_b_C$2"));
}

#[test]
fn test_deep_constructor_chain() {
    let mut program = Program::new().with_extern(SourceSymbol::class("lib.L0"));
    for depth in 1..=12 {
        let class = ClassNode::new(format!("lib.L{}", depth)).extends(format!("lib.L{}", depth - 1));
        program = program.with_module(ModuleIr::single(class));
    }
    let table = SymbolTable::from_program(&program, NameStyle::Dotted).unwrap();

    let leaf = table.lookup(&"lib.L12".into()).unwrap();
    let chain: Vec<String> = table
        .constructor_chain(leaf)
        .into_iter()
        .map(|id| table.get(id).qualified.to_string())
        .collect();
    assert_eq!(chain.len(), 12);
    assert_eq!(chain.first().map(String::as_str), Some("lib.L11"));
    assert_eq!(chain.last().map(String::as_str), Some("lib.L0"));
}

#[test]
fn test_forward_references_resolve() {
    // The subclass module comes before its base
    let program = Program::new()
        .with_module(ModuleIr::single(ClassNode::new("app.Child").extends("app.Parent")))
        .with_module(ModuleIr::single(ClassNode::new("app.Parent")));
    let table = SymbolTable::from_program(&program, NameStyle::Dotted).unwrap();
    let child = table.resolve(&"app.Child".into(), &"test".into()).unwrap();
    assert_eq!(
        child.base.map(|id| table.get(id).qualified.clone()),
        Some(QualifiedName::new("app.Parent"))
    );
}

#[test]
fn test_every_resolution_error_is_reported() {
    let program = Program::new()
        .with_module(ModuleIr::single(ClassNode::new("app.A").extends("missing.X")))
        .with_module(ModuleIr::single(ClassNode::new("app.B").implements("missing.Y")))
        .with_module(ModuleIr::single(ClassNode::new("app.C").extends("app.D")))
        .with_module(ModuleIr::single(ClassNode::new("app.D").extends("app.C")));
    let errors = SymbolTable::from_program(&program, NameStyle::Dotted).unwrap_err();

    let unresolved: Vec<&str> = errors
        .iter()
        .filter_map(|e| match e {
            CodegenError::UnresolvedSymbol { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(unresolved, vec!["missing.X", "missing.Y"]);
    assert_eq!(
        errors
            .iter()
            .filter(|e| matches!(e, CodegenError::InheritanceCycle { .. }))
            .count(),
        1
    );
}

#[test]
fn test_conflicting_redefinition() {
    let mut builder = SymbolTableBuilder::new();
    builder.register(SourceSymbol::class("app.Model")).unwrap();
    builder.register(SourceSymbol::class("app.Model")).unwrap();
    let err = builder
        .register(SourceSymbol::class("app.Model").extends("app.Base"))
        .unwrap_err();
    assert!(matches!(err, CodegenError::DuplicateSymbol { .. }));
    assert_eq!(builder.len(), 1);
}

#[test]
fn test_capabilities_flow_down_the_chain() {
    let program = Program::new()
        .with_extern(SourceSymbol::class("core.Dispatcher").dispatching_events())
        .with_module(ModuleIr::single(ClassNode::new("app.View").extends("core.Dispatcher")))
        .with_module(ModuleIr::single(ClassNode::new("app.Button").extends("app.View")));
    let table = SymbolTable::from_program(&program, NameStyle::Dotted).unwrap();
    let button = table.resolve(&"app.Button".into(), &"test".into()).unwrap();
    assert!(button.capabilities.dispatches_events);
    assert!(button.capabilities.reflectable);
}
