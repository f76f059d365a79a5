//! Module assembly
//!
//! Joins the emitted class bodies of one source module into an output unit:
//! file overview header, the provide declaration, sorted requires, then the
//! class bodies in declaration order.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::emit::{quote, ClassBody, CodeWriter};
use crate::error::{CodegenError, CodegenResult};
use crate::ir::{ModuleIr, QualifiedName, SourceLocation};
use crate::options::EmitOptions;
use crate::symbols::{flatten, NameStyle, SymbolTable};

/// One emitted module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Module qualified name
    pub module: QualifiedName,
    /// Provided identifier
    pub provide: String,
    /// Required identifiers, sorted by qualified name
    pub requires: Vec<String>,
    /// Relative output path (`pkg/sub/Name.js`)
    pub path: PathBuf,
    /// Full module text
    pub text: String,
}

impl OutputUnit {
    /// Whether `output_name` is among the requires
    pub fn requires_module(&self, output_name: &str) -> bool {
        self.requires.iter().any(|r| r == output_name)
    }
}

/// Relative output path of a module
pub fn output_path(module: &QualifiedName) -> PathBuf {
    let mut path: PathBuf = module.as_str().split('.').collect();
    path.set_extension("js");
    path
}

/// Assembles output units
pub struct ModuleAssembler<'a> {
    options: &'a EmitOptions,
}

impl<'a> ModuleAssembler<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        Self { options }
    }

    /// Assemble `module` from the bodies of its classes, in declaration order
    pub fn assemble(
        &self,
        module: &ModuleIr,
        bodies: &[ClassBody],
        table: &SymbolTable,
    ) -> CodegenResult<OutputUnit> {
        if module.classes.is_empty() {
            return Err(CodegenError::EmptyModule {
                module: module.name.clone(),
                location: module.source.as_ref().map(|file| SourceLocation::new(file.clone(), 1, 1)),
            });
        }
        let declared = module.classes.iter().map(|c| &c.name);
        if bodies.len() != module.classes.len() || !bodies.iter().map(|b| &b.name).eq(declared) {
            return Err(CodegenError::Internal {
                class: module.name.clone(),
                message: "class bodies do not match the module's declarations".to_string(),
            });
        }

        let owned: BTreeSet<&QualifiedName> = module
            .classes
            .iter()
            .map(|c| &c.name)
            .chain(std::iter::once(&module.name))
            .collect();
        let required: BTreeSet<&QualifiedName> = bodies
            .iter()
            .flat_map(|b| &b.deps)
            .filter(|name| !owned.contains(name))
            .collect();
        let requires: Vec<String> = required
            .into_iter()
            .map(|name| output_name(table, name))
            .collect();
        let provide = output_name(table, &module.name);

        let mut w = CodeWriter::new();
        if self.options.emit_file_overview {
            let generated = match &module.source {
                Some(source) => format!("Generated by Kestrel from {}", source),
                None => "Generated by Kestrel".to_string(),
            };
            w.doc([
                generated.as_str(),
                module.name.as_str(),
                "",
                "@fileoverview",
                "",
                "@suppress {checkTypes|accessControls}",
            ]);
            w.blank();
        }
        w.line(format!("{}({});", self.options.provide_fn, quote(&provide)));
        w.blank();
        if !requires.is_empty() {
            for name in &requires {
                w.line(format!("{}({});", self.options.require_fn, quote(name)));
            }
            w.blank();
        }
        for body in bodies {
            w.blank();
            w.lines(&body.text);
        }

        debug!(
            target: "codegen",
            module = %module.name,
            classes = bodies.len(),
            requires = requires.len(),
            "assembled module"
        );

        Ok(OutputUnit {
            module: module.name.clone(),
            provide,
            requires,
            path: output_path(&module.name),
            text: w.finish(),
        })
    }
}

fn output_name(table: &SymbolTable, name: &QualifiedName) -> String {
    match table.output_name(name) {
        Some(output) => output.to_string(),
        None => match table.name_style() {
            NameStyle::Dotted => name.as_str().to_string(),
            NameStyle::Flattened => flatten(name),
        },
    }
}
