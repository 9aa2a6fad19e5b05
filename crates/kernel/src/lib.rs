//! Turns a flat kernel body into a control flow graph with numbered registers, and back into text.

#![forbid(unsafe_code)]
#![allow(clippy::match_bool)]
#![warn(clippy::must_use_candidate)]

use std::cell::OnceCell;
use std::collections::BTreeMap;

use ptxk_core::{Parameter, Statement, Variable};

mod build;
pub mod cfg;
mod collect;
mod dfg;
mod error;
mod id;
mod regalloc;
mod write;


pub use build::build;
pub use cfg::{BasicBlock, ControlFlowGraph, Edge, EdgeKind};
pub use collect::{Register, referenced_registers, referenced_registers_without_dfg};
pub use dfg::{DataflowBlock, DataflowGraph};
pub use error::BuildError;
pub use id::BlockId;
pub use regalloc::{RegisterMap, assign_registers};
pub use write::{CANONICAL_LABEL_PREFIX, KernelDisplay, WriteOptions};

#[derive(Debug)]
pub struct Kernel {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// `.local` and `.shared` declarations by name.
    pub locals: BTreeMap<String, Variable>,
    cfg: ControlFlowGraph,
    registers: RegisterMap,
    dfg: OnceCell<DataflowGraph>,
}

impl Kernel {
    /// A kernel with an empty body.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            locals: BTreeMap::new(),
            cfg: ControlFlowGraph::new(),
            registers: RegisterMap::new(),
            dfg: OnceCell::new(),
        }
    }

    /// Builds the graph for one kernel body and numbers its registers.
    ///
    /// # Errors
    /// Returns the first structural problem [`build`] finds in the body.
    pub fn from_statements(statements: &[Statement]) -> Result<Self, BuildError> {
        let mut kernel = Self::new("");

        for statement in statements {
            match statement {
                Statement::Entry(name) => name.clone_into(&mut kernel.name),
                Statement::Param(param) => kernel.parameters.push(param.clone()),
                Statement::Local(var) | Statement::Shared(var) => {
                    kernel.locals.entry(var.name.clone()).or_insert_with(|| var.clone());
                }
                Statement::Label(_) | Statement::Instruction(_) => {}
            }
        }

        let _span = tracing::debug_span!("kernel", name = %kernel.name).entered();

        kernel.cfg = build(statements)?;
        kernel.registers = assign_registers(&mut kernel.cfg);

        Ok(kernel)
    }

    #[must_use]
    pub const fn cfg(&self) -> &ControlFlowGraph {
        &self.cfg
    }

    /// The register numbering produced while building the kernel.
    #[must_use]
    pub const fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    /// The dataflow graph, built on first use.
    ///
    /// Once it exists register declarations switch to [`referenced_registers`].
    #[must_use]
    pub fn dfg(&self) -> &DataflowGraph {
        self.dfg.get_or_init(|| DataflowGraph::new(&self.cfg))
    }

    #[must_use]
    pub fn has_dfg(&self) -> bool {
        self.dfg.get().is_some()
    }

    /// The `.reg` declarations this kernel needs.
    #[must_use]
    pub fn register_declarations(&self) -> Vec<Register> {
        let registers = match self.dfg.get() {
            Some(dfg) => referenced_registers(dfg),
            None => referenced_registers_without_dfg(&self.cfg),
        };

        tracing::debug!(with_dfg = self.has_dfg(), count = registers.len(), "collected register declarations");

        registers
    }
}
