//! Phase orchestration
//!
//! 1. Build and freeze the symbol table (single thread).
//! 2. Emit every class. Class tasks go through a shared injector drained by
//!    scoped worker threads; each result lands in the slot of its class, so
//!    the output never depends on scheduling.
//! 3. Assemble each module whose classes all succeeded.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_deque::{Injector, Steal};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::emit::{emit_class, ClassBody};
use crate::error::{CodegenError, CodegenResult, CompileErrors};
use crate::ir::{ClassNode, Program};
use crate::module::{ModuleAssembler, OutputUnit};
use crate::options::EmitOptions;
use crate::symbols::SymbolTable;

/// Stack size of class emission workers
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running class tasks finish, queued ones are skipped
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self) -> CodegenResult<()> {
        if self.is_cancelled() {
            Err(CodegenError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Result of a run that got past symbol resolution
#[derive(Debug)]
pub struct CompileOutput {
    /// Assembled modules, in program order
    pub units: Vec<OutputUnit>,
    /// Failures in (module, class) order
    pub errors: Vec<CodegenError>,
    /// The frozen symbol table
    pub table: SymbolTable,
}

impl CompileOutput {
    /// Whether every module compiled
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Drives the three phases
pub struct Compiler {
    options: EmitOptions,
    cancel: CancellationToken,
}

impl Compiler {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Compile `program`; any failure fails the whole run
    pub fn compile(&self, program: &Program) -> Result<CompileOutput, CompileErrors> {
        let output = self.run(program)?;
        if output.is_success() {
            Ok(output)
        } else {
            Err(CompileErrors::new(output.errors))
        }
    }

    /// Compile `program`, keeping the modules that succeeded
    ///
    /// Only symbol resolution failures and cancellation abort the run. Class
    /// and module failures are collected in [`CompileOutput::errors`].
    pub fn run(&self, program: &Program) -> Result<CompileOutput, CompileErrors> {
        self.cancel.check()?;
        info!(target: "codegen", stage = "symbols", modules = program.modules.len(), "building symbol table");
        let table = SymbolTable::from_program(program, self.options.name_style)?;
        debug!(target: "codegen", stage = "symbols", symbols = table.len(), "symbol table frozen");

        self.cancel.check()?;
        let tasks: Vec<(usize, &ClassNode)> = program
            .modules
            .iter()
            .enumerate()
            .flat_map(|(m, module)| module.classes.iter().map(move |class| (m, class)))
            .collect();
        let results = self.emit_classes(&tasks, &table)?;
        self.cancel.check()?;

        info!(target: "codegen", stage = "modules", "assembling modules");
        let assembler = ModuleAssembler::new(&self.options);
        let mut results = results.into_iter();
        let mut units = Vec::new();
        let mut errors = Vec::new();
        for module in &program.modules {
            let mut bodies = Vec::with_capacity(module.classes.len());
            let mut failed = false;
            for result in results.by_ref().take(module.classes.len()) {
                match result {
                    Ok(body) => bodies.push(body),
                    Err(err) => {
                        warn!(target: "codegen", module = %module.name, error = %err, "class failed");
                        errors.push(err);
                        failed = true;
                    }
                }
            }
            if failed {
                debug!(target: "codegen", module = %module.name, "skipping module with failed classes");
                continue;
            }
            match assembler.assemble(module, &bodies, &table) {
                Ok(unit) => units.push(unit),
                Err(err) => {
                    warn!(target: "codegen", module = %module.name, error = %err, "module failed");
                    errors.push(err);
                }
            }
        }

        info!(
            target: "codegen",
            stage = "done",
            units = units.len(),
            errors = errors.len(),
            "code generation finished"
        );
        Ok(CompileOutput { units, errors, table })
    }

    fn emit_classes(
        &self,
        tasks: &[(usize, &ClassNode)],
        table: &SymbolTable,
    ) -> Result<Vec<CodegenResult<ClassBody>>, CompileErrors> {
        let workers = self.options.worker_count().min(tasks.len()).max(1);
        info!(target: "codegen", stage = "classes", classes = tasks.len(), workers, "emitting classes");

        let injector = Injector::new();
        for index in 0..tasks.len() {
            injector.push(index);
        }
        let slots: Vec<Mutex<Option<CodegenResult<ClassBody>>>> =
            tasks.iter().map(|_| Mutex::new(None)).collect();

        let scope = crossbeam::thread::scope(|s| {
            let mut spawned = 0;
            for worker in 0..workers {
                let handle = s
                    .builder()
                    .name(format!("kestrel-codegen-{}", worker))
                    .stack_size(WORKER_STACK_SIZE)
                    .spawn(|_| self.drain(&injector, tasks, &slots, table));
                match handle {
                    Ok(_) => spawned += 1,
                    Err(err) => warn!(target: "codegen", worker, error = %err, "failed to spawn worker"),
                }
            }
            if spawned == 0 {
                self.drain(&injector, tasks, &slots, table);
            }
        });
        if scope.is_err() {
            return Err(CodegenError::Internal {
                class: tasks
                    .first()
                    .map(|(_, c)| c.name.clone())
                    .unwrap_or_else(|| "<program>".into()),
                message: "worker thread panicked".to_string(),
            }
            .into());
        }

        self.cancel.check()?;
        slots
            .into_iter()
            .zip(tasks)
            .map(|(slot, (_, class))| {
                slot.into_inner().ok_or_else(|| {
                    CompileErrors::from(CodegenError::Internal {
                        class: class.name.clone(),
                        message: "class was never emitted".to_string(),
                    })
                })
            })
            .collect()
    }

    fn drain(
        &self,
        injector: &Injector<usize>,
        tasks: &[(usize, &ClassNode)],
        slots: &[Mutex<Option<CodegenResult<ClassBody>>>],
        table: &SymbolTable,
    ) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let index = match injector.steal() {
                Steal::Success(index) => index,
                Steal::Empty => return,
                Steal::Retry => continue,
            };
            let class = tasks[index].1;
            let result = panic::catch_unwind(AssertUnwindSafe(|| emit_class(class, table, &self.options)))
                .unwrap_or_else(|_| {
                    Err(CodegenError::Internal {
                        class: class.name.clone(),
                        message: "class emission panicked".to_string(),
                    })
                });
            *slots[index].lock() = Some(result);
        }
    }
}
