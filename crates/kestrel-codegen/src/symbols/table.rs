//! Symbol registration and resolution

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::naming::{flatten, NameStyle};
use super::symbol::{Capabilities, Symbol, SymbolId};
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{Program, QualifiedName, SourceSymbol};

/// Pass A: collects symbol stubs
#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
    stubs: Vec<SourceSymbol>,
    index: FxHashMap<QualifiedName, SymbolId>,
}

impl SymbolTableBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every extern and every class of a program.
    /// Returns all duplicate-definition errors.
    pub fn register_program(&mut self, program: &Program) -> Result<(), Vec<CodegenError>> {
        let mut errors = Vec::new();
        let stubs = program
            .externs
            .iter()
            .cloned()
            .chain(program.classes().map(SourceSymbol::from_class));
        for stub in stubs {
            if let Err(e) = self.register(stub) {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Register a symbol stub
    ///
    /// Registering an identical definition twice returns the existing id. A
    /// different definition under the same qualified name is a
    /// `DuplicateSymbol` error.
    pub fn register(&mut self, symbol: SourceSymbol) -> CodegenResult<SymbolId> {
        if let Some(&id) = self.index.get(&symbol.name) {
            let existing = &self.stubs[id.index()];
            if existing.same_definition(&symbol) {
                return Ok(id);
            }
            return Err(CodegenError::DuplicateSymbol {
                name: symbol.name,
                first: existing.location.clone(),
                second: symbol.location,
            });
        }

        let id = SymbolId(self.stubs.len() as u32);
        self.index.insert(symbol.name.clone(), id);
        self.stubs.push(symbol);
        Ok(id)
    }

    /// Number of registered stubs
    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Pass B: resolve references and freeze
    pub fn freeze(self, style: NameStyle) -> Result<SymbolTable, Vec<CodegenError>> {
        let mut errors = Vec::new();

        // Resolve base and interface links against the full stub set
        let mut links: Vec<(Option<SymbolId>, Vec<SymbolId>)> = Vec::with_capacity(self.stubs.len());
        for stub in &self.stubs {
            let base = stub.base.as_ref().and_then(|base| {
                let id = self.index.get(base).copied();
                if id.is_none() {
                    errors.push(unresolved(base, stub));
                }
                id
            });
            let mut interfaces = Vec::with_capacity(stub.interfaces.len());
            for iface in &stub.interfaces {
                match self.index.get(iface) {
                    Some(&id) => interfaces.push(id),
                    None => errors.push(unresolved(iface, stub)),
                }
            }
            links.push((base, interfaces));
        }

        errors.extend(self.inheritance_cycles(&links));
        if !errors.is_empty() {
            return Err(errors);
        }

        let output_names = assign_output_names(&self.stubs, style);

        let symbols: Vec<Symbol> = self
            .stubs
            .iter()
            .zip(links)
            .zip(output_names)
            .enumerate()
            .map(|(i, ((stub, (base, interfaces)), output_name))| Symbol {
                id: SymbolId(i as u32),
                qualified: stub.name.clone(),
                kind: stub.kind,
                visibility: stub.visibility,
                base,
                interfaces,
                capabilities: Capabilities {
                    reflectable: stub.reflectable,
                    bindable: stub.bindable,
                    dispatches_events: stub.dispatches_events,
                },
                output_name,
                location: stub.location.clone(),
            })
            .collect();

        let mut table = SymbolTable {
            symbols,
            index: self.index,
            by_simple: FxHashMap::default(),
            style,
        };
        table.flatten_capabilities();
        for symbol in &table.symbols {
            table
                .by_simple
                .entry(symbol.simple_name().to_string())
                .or_default()
                .push(symbol.id);
        }
        Ok(table)
    }

    /// Find every base-chain cycle, each reported once starting at its
    /// lexically smallest member
    fn inheritance_cycles(&self, links: &[(Option<SymbolId>, Vec<SymbolId>)]) -> Vec<CodegenError> {
        let mut seen: BTreeSet<Vec<QualifiedName>> = BTreeSet::new();
        let mut errors = Vec::new();

        for start in 0..self.stubs.len() {
            let mut path: Vec<usize> = vec![start];
            let mut current = start;
            while let Some(next) = links[current].0 {
                let next = next.index();
                if let Some(pos) = path.iter().position(|&p| p == next) {
                    let members = &path[pos..];
                    let min = members
                        .iter()
                        .enumerate()
                        .min_by(|a, b| self.stubs[*a.1].name.cmp(&self.stubs[*b.1].name))
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    let mut cycle: Vec<QualifiedName> = members[min..]
                        .iter()
                        .chain(&members[..min])
                        .map(|&i| self.stubs[i].name.clone())
                        .collect();
                    cycle.push(cycle[0].clone());
                    if seen.insert(cycle.clone()) {
                        errors.push(CodegenError::InheritanceCycle {
                            location: self.stubs[members[min]].location.clone(),
                            cycle,
                        });
                    }
                    break;
                }
                path.push(next);
                current = next;
            }
        }
        errors
    }
}

fn unresolved(name: &QualifiedName, from: &SourceSymbol) -> CodegenError {
    CodegenError::UnresolvedSymbol {
        name: name.clone(),
        referenced_from: from.name.clone(),
        location: from.location.clone(),
    }
}

/// Output identifiers in registration order
///
/// Flattened names can collide (`a_b.C` and `a.b_C` both become `a_b_C`).
/// Colliding names are ranked by qualified name: the first keeps the plain
/// form, the rest get `$1`, `$2`, ….
fn assign_output_names(stubs: &[SourceSymbol], style: NameStyle) -> Vec<String> {
    match style {
        NameStyle::Dotted => stubs.iter().map(|s| s.name.as_str().to_string()).collect(),
        NameStyle::Flattened => {
            let mut groups: FxHashMap<String, Vec<usize>> = FxHashMap::default();
            for (i, stub) in stubs.iter().enumerate() {
                groups.entry(flatten(&stub.name)).or_default().push(i);
            }
            let mut names = vec![String::new(); stubs.len()];
            for (flat, mut members) in groups {
                members.sort_by(|&a, &b| stubs[a].name.cmp(&stubs[b].name));
                for (rank, i) in members.into_iter().enumerate() {
                    names[i] = if rank == 0 {
                        flat.clone()
                    } else {
                        format!("{}${}", flat, rank)
                    };
                }
            }
            names
        }
    }
}

/// Frozen, immutable symbol table
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: FxHashMap<QualifiedName, SymbolId>,
    by_simple: FxHashMap<String, Vec<SymbolId>>,
    style: NameStyle,
}

impl SymbolTable {
    /// Build and freeze a table for a whole program
    pub fn from_program(program: &Program, style: NameStyle) -> Result<Self, Vec<CodegenError>> {
        let mut builder = SymbolTableBuilder::new();
        builder.register_program(program)?;
        builder.freeze(style)
    }

    /// Resolve a reference made from `referenced_from`
    pub fn resolve(&self, name: &QualifiedName, referenced_from: &QualifiedName) -> CodegenResult<&Symbol> {
        self.lookup(name)
            .map(|id| self.get(id))
            .ok_or_else(|| CodegenError::UnresolvedSymbol {
                name: name.clone(),
                referenced_from: referenced_from.clone(),
                location: None,
            })
    }

    /// Id of a registered name
    pub fn lookup(&self, name: &QualifiedName) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    /// Whether a name is registered
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.index.contains_key(name)
    }

    /// Symbol by id
    ///
    /// Ids are only produced by this table, so they are always in range.
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Output identifier of a registered name
    pub fn output_name(&self, name: &QualifiedName) -> Option<&str> {
        self.lookup(name).map(|id| self.get(id).output_name.as_str())
    }

    /// Base classes from the direct parent up to the root
    pub fn constructor_chain(&self, id: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).base;
        while let Some(base) = current {
            chain.push(base);
            current = self.get(base).base;
        }
        chain
    }

    /// Every symbol sharing a simple name, in registration order
    pub fn symbols_named(&self, simple: &str) -> &[SymbolId] {
        self.by_simple.get(simple).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Naming style the output names were built with
    pub fn name_style(&self) -> NameStyle {
        self.style
    }

    /// All symbols in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    // Chains are acyclic once freeze has run cycle detection.
    fn flatten_capabilities(&mut self) {
        let flattened: Vec<Capabilities> = (0..self.symbols.len())
            .map(|i| {
                let id = SymbolId(i as u32);
                self.constructor_chain(id)
                    .into_iter()
                    .fold(self.get(id).capabilities, |caps, base| {
                        caps.union(self.get(base).capabilities)
                    })
            })
            .collect();
        for (symbol, caps) in self.symbols.iter_mut().zip(flattened) {
            symbol.capabilities = caps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SourceLocation;

    fn freeze(symbols: Vec<SourceSymbol>, style: NameStyle) -> Result<SymbolTable, Vec<CodegenError>> {
        let mut builder = SymbolTableBuilder::new();
        for symbol in symbols {
            builder.register(symbol).unwrap();
        }
        builder.freeze(style)
    }

    #[test]
    fn test_identical_registration_is_idempotent() {
        let mut builder = SymbolTableBuilder::new();
        let a = builder.register(SourceSymbol::class("ui.Button")).unwrap();
        let b = builder.register(SourceSymbol::class("ui.Button")).unwrap();
        assert_eq!(a, b);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_distinct_registration_is_duplicate() {
        let mut builder = SymbolTableBuilder::new();
        let mut first = SourceSymbol::class("ui.Button");
        first.location = Some(SourceLocation::new("a/Button.as", 1, 1));
        builder.register(first).unwrap();

        let mut second = SourceSymbol::class("ui.Button").extends("ui.UIBase");
        second.location = Some(SourceLocation::new("b/Button.as", 2, 1));
        let err = builder.register(second).unwrap_err();
        match err {
            CodegenError::DuplicateSymbol {
                name,
                first,
                second,
            } => {
                assert_eq!(name.as_str(), "ui.Button");
                assert_eq!(first.unwrap().file, "a/Button.as");
                assert_eq!(second.unwrap().file, "b/Button.as");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_forward_base_reference_resolves() {
        let table = freeze(
            vec![
                SourceSymbol::class("app.Main").extends("core.Application"),
                SourceSymbol::class("core.Application").dispatching_events(),
            ],
            NameStyle::Dotted,
        )
        .unwrap();

        let main = table.lookup(&"app.Main".into()).unwrap();
        let base = table.get(main).base.unwrap();
        assert_eq!(table.get(base).qualified.as_str(), "core.Application");
        assert!(table.get(main).capabilities.dispatches_events);
    }

    #[test]
    fn test_unresolved_references_all_reported() {
        let mut iface_user = SourceSymbol::class("a.A").extends("missing.Base");
        iface_user.interfaces.push("missing.IFace".into());
        let errors = freeze(vec![iface_user], NameStyle::Dotted).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, CodegenError::UnresolvedSymbol { .. })));
    }

    #[test]
    fn test_inheritance_cycle_reported_once() {
        let errors = freeze(
            vec![
                SourceSymbol::class("b.B").extends("a.A"),
                SourceSymbol::class("a.A").extends("b.B"),
                SourceSymbol::class("c.C").extends("a.A"),
            ],
            NameStyle::Dotted,
        )
        .unwrap_err();
        assert_eq!(
            errors,
            vec![CodegenError::InheritanceCycle {
                cycle: vec!["a.A".into(), "b.B".into(), "a.A".into()],
                location: None,
            }]
        );
    }

    #[test]
    fn test_capabilities_flatten_down_chain() {
        let mut base = SourceSymbol::class("core.Bindable");
        base.bindable = true;
        let table = freeze(
            vec![
                base,
                SourceSymbol::class("core.Mid").extends("core.Bindable"),
                SourceSymbol::class("app.Leaf").extends("core.Mid"),
            ],
            NameStyle::Dotted,
        )
        .unwrap();
        let leaf = table.lookup(&"app.Leaf".into()).unwrap();
        assert!(table.get(leaf).capabilities.bindable);
        let chain: Vec<&str> = table
            .constructor_chain(leaf)
            .into_iter()
            .map(|id| table.get(id).qualified.as_str())
            .collect();
        assert_eq!(chain, vec!["core.Mid", "core.Bindable"]);
    }

    #[test]
    fn test_same_simple_name_is_not_a_collision() {
        let table = freeze(
            vec![SourceSymbol::class("a.Event"), SourceSymbol::class("b.Event")],
            NameStyle::Dotted,
        )
        .unwrap();
        assert_eq!(table.symbols_named("Event").len(), 2);
        assert_eq!(table.output_name(&"a.Event".into()), Some("a.Event"));
        assert_eq!(table.output_name(&"b.Event".into()), Some("b.Event"));
    }

    #[test]
    fn test_flattened_collisions_get_suffixes() {
        let table = freeze(
            vec![
                SourceSymbol::class("a.b_C"),
                SourceSymbol::class("a_b.C"),
                SourceSymbol::class("x.Y"),
            ],
            NameStyle::Flattened,
        )
        .unwrap();
        // "a.b_C" < "a_b.C" bytewise ('.' < '_')
        assert_eq!(table.output_name(&"a.b_C".into()), Some("a_b_C"));
        assert_eq!(table.output_name(&"a_b.C".into()), Some("a_b_C$1"));
        assert_eq!(table.output_name(&"x.Y".into()), Some("x_Y"));
    }

    #[test]
    fn test_table_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SymbolTable>();
    }
}
