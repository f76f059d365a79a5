//! Per-class dependency collection
//!
//! Walks everything the class emitter will reference and returns the set of
//! symbols the class needs at load time. The module assembler turns the union
//! of its classes' sets into require declarations, so this walk must match
//! what [`crate::emit`] actually writes: a missed reference is a runtime load
//! failure, an extra one is an unnecessary (possibly circular) require.

use std::collections::BTreeSet;

use crate::error::{CodegenError, CodegenResult};
use crate::ir::{
    ClassNode, DeclarativeTree, Expr, PropertyValue, QualifiedName, SourceLocation, Stmt, TypeRef,
};
use crate::options::EmitOptions;
use crate::symbols::SymbolTable;

/// Collect the dependencies of one class, sorted by qualified name
pub fn collect(
    class: &ClassNode,
    table: &SymbolTable,
    options: &EmitOptions,
) -> CodegenResult<BTreeSet<QualifiedName>> {
    let mut collector = DependencyCollector::new(class, table);

    if let Some(base) = &class.base {
        collector.add(base, class.location.as_ref())?;
    }
    for iface in &class.interfaces {
        collector.add(iface, class.location.as_ref())?;
    }

    for field in &class.fields {
        collector.add_type(&field.ty, class.location.as_ref())?;
        if let Some(init) = &field.initializer {
            collector.add_expr(init, class.location.as_ref())?;
        }
    }
    for accessor in &class.accessors {
        collector.add_type(&accessor.ty, class.location.as_ref())?;
        if let Some(init) = &accessor.initializer {
            collector.add_expr(init, class.location.as_ref())?;
        }
    }

    // Signature types only appear in annotations
    for method in &class.methods {
        let location = method.location.as_ref().or(class.location.as_ref());
        collector.add_body(&method.body, location)?;
    }

    for event in &class.events {
        let location = event.location.as_ref().or(class.location.as_ref());
        if let Some(ty) = &event.event_type {
            collector.add_type(ty, location)?;
        }
        collector.add_body(&event.body, location)?;
    }

    if let Some(tree) = &class.declarative {
        collector.add_tree(tree)?;
    }

    if class.has_bindable_members() {
        collector.add_support(&options.change_event_class);
    }
    if collector.casts {
        collector.add_support(&options.language_helper);
    }

    Ok(collector.found)
}

struct DependencyCollector<'a> {
    class: &'a ClassNode,
    table: &'a SymbolTable,
    found: BTreeSet<QualifiedName>,
    casts: bool,
}

impl<'a> DependencyCollector<'a> {
    fn new(class: &'a ClassNode, table: &'a SymbolTable) -> Self {
        Self {
            class,
            table,
            found: BTreeSet::new(),
            casts: false,
        }
    }

    fn add(&mut self, name: &QualifiedName, location: Option<&SourceLocation>) -> CodegenResult<()> {
        if *name == self.class.name {
            return Ok(());
        }
        if !self.table.contains(name) {
            return Err(CodegenError::UnresolvedSymbol {
                name: name.clone(),
                referenced_from: self.class.name.clone(),
                location: location.cloned(),
            });
        }
        self.found.insert(name.clone());
        Ok(())
    }

    fn add_type(&mut self, ty: &TypeRef, location: Option<&SourceLocation>) -> CodegenResult<()> {
        match ty.as_class() {
            Some(name) => self.add(name, location),
            None => Ok(()),
        }
    }

    fn add_expr(&mut self, expr: &Expr, location: Option<&SourceLocation>) -> CodegenResult<()> {
        let mut refs = Vec::new();
        expr.visit_class_refs(&mut |name| refs.push(name.clone()));
        for name in &refs {
            self.add(name, location)?;
        }
        self.casts |= expr.contains_cast();
        Ok(())
    }

    fn add_body(&mut self, body: &[Stmt], location: Option<&SourceLocation>) -> CodegenResult<()> {
        for stmt in body {
            for expr in stmt.expressions() {
                self.add_expr(expr, location)?;
            }
        }
        Ok(())
    }

    fn add_tree(&mut self, tree: &DeclarativeTree) -> CodegenResult<()> {
        // Unreachable nodes are never emitted
        for node in tree.reachable() {
            let location = node.location.as_ref().or(self.class.location.as_ref());
            // The root is the class itself or its base
            if node.key != tree.root {
                self.add(&node.target, location)?;
            }
            for property in &node.properties {
                if let PropertyValue::Expression(expr) = &property.value {
                    self.add_expr(expr, location)?;
                }
            }
        }
        Ok(())
    }

    // Runtime support classes are only required when the program registers them
    fn add_support(&mut self, name: &QualifiedName) {
        if self.table.contains(name) && *name != self.class.name {
            self.found.insert(name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AccessorSpec, EventBindingSpec, FieldSpec, MethodSpec, Program, SourceSymbol, TreeBuilder};
    use crate::symbols::NameStyle;

    fn table_with(class: &ClassNode, externs: &[&str]) -> SymbolTable {
        let mut program = Program::new().with_module(crate::ir::ModuleIr::single(class.clone()));
        for name in externs {
            program = program.with_extern(SourceSymbol::class(*name));
        }
        SymbolTable::from_program(&program, NameStyle::Dotted).unwrap()
    }

    fn names(set: &BTreeSet<QualifiedName>) -> Vec<&str> {
        set.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_types_and_base_collected_sorted() {
        let class = ClassNode::new("app.Main")
            .extends("core.Base")
            .with_field(FieldSpec::new("count", "int"))
            .with_field(FieldSpec::new("model", "models.Model"))
            .with_accessor(AccessorSpec::new("label", "ui.Label"));
        let table = table_with(&class, &["core.Base", "models.Model", "ui.Label"]);

        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert_eq!(names(&deps), vec!["core.Base", "models.Model", "ui.Label"]);
    }

    #[test]
    fn test_self_reference_excluded() {
        let class = ClassNode::new("app.Node").with_field(FieldSpec::new("next", "app.Node"));
        let table = table_with(&class, &[]);
        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_method_signature_types_are_not_dependencies() {
        let class = ClassNode::new("app.Main").with_method(
            MethodSpec::new("load")
                .param("source", "net.Source")
                .returns("net.Result"),
        );
        let table = table_with(&class, &["net.Source", "net.Result"]);
        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_deeply_nested_tree_targets_collected() {
        let mut tree = TreeBuilder::new("core.View");
        let outer = tree.node("ui.Group");
        let middle = tree.node("ui.Panel");
        let inner = tree.node("ui.Button");
        tree.children(tree.root(), "content", vec![outer])
            .child(outer, "body", middle)
            .content(middle, inner);
        let class = ClassNode::new("app.Main")
            .extends("core.View")
            .with_declarative(tree.build());
        let table = table_with(&class, &["core.View", "ui.Group", "ui.Panel", "ui.Button"]);

        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert_eq!(names(&deps), vec!["core.View", "ui.Button", "ui.Group", "ui.Panel"]);
    }

    #[test]
    fn test_unreachable_nodes_add_no_requires() {
        let mut tree = TreeBuilder::new("ui.View");
        let label = tree.node("ui.Label");
        tree.node_with_id("ui.Orphan", "orphan");
        tree.content(tree.root(), label);
        let class = ClassNode::new("app.Main")
            .extends("ui.View")
            .with_declarative(tree.build());
        let table = table_with(
            &class,
            &["ui.View", "ui.Label", "ui.Orphan", "org.apache.royale.events.ValueChangeEvent"],
        );

        assert!(!class.has_bindable_members());
        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert_eq!(names(&deps), vec!["ui.Label", "ui.View"]);
    }

    #[test]
    fn test_cast_pulls_language_helper_when_registered() {
        let class = ClassNode::new("app.Main").with_event(
            EventBindingSpec::new(crate::ir::NodeKey(0), "initialize").stmt(Stmt::expr(Expr::cast(
                Expr::local("event"),
                "events.Custom",
            ))),
        );

        let table = table_with(&class, &["events.Custom"]);
        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert_eq!(names(&deps), vec!["events.Custom"]);

        let table = table_with(&class, &["events.Custom", "org.apache.royale.utils.Language"]);
        let deps = collect(&class, &table, &EmitOptions::default()).unwrap();
        assert_eq!(
            names(&deps),
            vec!["events.Custom", "org.apache.royale.utils.Language"]
        );
    }

    #[test]
    fn test_unregistered_reference_fails() {
        let class = ClassNode::new("app.Main").with_field(FieldSpec::new("x", "missing.Type"));
        let table = table_with(&class, &[]);
        let err = collect(&class, &table, &EmitOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnresolvedSymbol { ref name, .. } if name.as_str() == "missing.Type"
        ));
    }
}
