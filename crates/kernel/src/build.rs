use fnv::FnvHashMap;
use ptxk_core::{Instruction, Opcode, Statement};

use crate::cfg::{BasicBlock, ControlFlowGraph, Edge, EdgeKind};
use crate::error::BuildError;
use crate::id::BlockId;

#[cfg(test)]
mod tests;

/// The edge leading into the block currently being filled, its tail is always that block.
#[derive(Debug, Copy, Clone)]
enum PendingEdge {
    None,
    FallThrough { head: BlockId },
}

struct Branch {
    origin: BlockId,
    target: String,
    dead: bool,
}

struct Builder {
    cfg: ControlFlowGraph,
    current: BlockId,
    pending: PendingEdge,
    labels: FnvHashMap<String, BlockId>,
    branches: Vec<Branch>,
    exit_seen: bool,
}

impl Builder {
    fn new() -> Self {
        let mut cfg = ControlFlowGraph::new();
        let entry = cfg.entry();
        let id = cfg.new_id();
        let current = cfg.insert_block(BasicBlock::new(id, ""));

        Self {
            cfg,
            current,
            pending: PendingEdge::FallThrough { head: entry },
            labels: FnvHashMap::default(),
            branches: Vec::new(),
            exit_seen: false,
        }
    }

    fn current_block(&mut self) -> &mut BasicBlock {
        match self.cfg.block_mut(self.current) {
            Some(block) => block,
            None => unreachable!("the current block is only removed by `finish`"),
        }
    }

    fn insert_edge(&mut self, edge: Edge) {
        tracing::trace!(%edge, "inserted edge");
        self.cfg.insert_edge(edge);
    }

    fn flush_pending(&mut self) {
        if let PendingEdge::FallThrough { head } = std::mem::replace(&mut self.pending, PendingEdge::None) {
            self.insert_edge(Edge::new(head, self.current, EdgeKind::FallThrough));
        }
    }

    /// Closes the current block and opens a fresh unlabeled one.
    fn start_block(&mut self, pending: PendingEdge) {
        let id = self.cfg.new_id();
        let closed = std::mem::replace(&mut self.current, self.cfg.insert_block(BasicBlock::new(id, "")));
        self.pending = pending;

        tracing::trace!(closed = %closed, opened = %id, "started block");
    }

    fn label(&mut self, label: &str, statement: usize) -> Result<(), BuildError> {
        if !self.current_block().is_empty() {
            self.flush_pending();
            let head = self.current;
            self.start_block(PendingEdge::FallThrough { head });
        }

        if self.labels.contains_key(label) {
            return Err(BuildError::DuplicateLabel { label: label.to_owned(), statement });
        }

        self.current_block().label = label.to_owned();
        self.labels.insert(label.to_owned(), self.current);

        Ok(())
    }

    fn instruction(&mut self, instruction: &Instruction, statement: usize) -> Result<(), BuildError> {
        match instruction.opcode {
            Opcode::Call => {
                return Err(BuildError::UnsupportedControlFlow { opcode: instruction.opcode, statement });
            }
            Opcode::Exit if self.exit_seen => return Err(BuildError::DuplicateExit { statement }),
            _ => {}
        }

        self.current_block().instructions.push(instruction.clone());

        match instruction.opcode {
            Opcode::Bra => {
                self.flush_pending();
                let origin = self.current;
                self.branches.push(Branch {
                    origin,
                    target: instruction.d.identifier.clone(),
                    dead: instruction.pg.is_always_false(),
                });

                let pending = match instruction.pg.is_always_true() {
                    true => PendingEdge::None,
                    false => PendingEdge::FallThrough { head: origin },
                };

                self.start_block(pending);
            }

            Opcode::Exit => {
                self.exit_seen = true;
                self.flush_pending();
                self.insert_edge(Edge::new(self.current, self.cfg.exit(), EdgeKind::FallThrough));
                self.start_block(PendingEdge::None);
            }

            Opcode::Ret => {
                self.flush_pending();
                self.insert_edge(Edge::new(self.current, self.cfg.exit(), EdgeKind::Branch));
                self.start_block(PendingEdge::None);
            }

            _ => {}
        }

        Ok(())
    }

    fn finish(mut self) -> Result<ControlFlowGraph, BuildError> {
        if self.current_block().is_empty() {
            let current = self.current;
            self.cfg.remove_block(current);
            self.labels.retain(|_, id| *id != current);
        } else {
            self.flush_pending();
        }

        if !self.exit_seen {
            return Err(BuildError::MissingExit);
        }

        for branch in std::mem::take(&mut self.branches) {
            let target = *self
                .labels
                .get(&branch.target)
                .ok_or_else(|| BuildError::UndefinedLabel { label: branch.target.clone() })?;

            let label = self.cfg.block(target).map(|it| it.label.clone()).unwrap_or_default();

            let bra = self.cfg.block_mut(branch.origin).and_then(|it| it.instructions.last_mut());
            if let Some(bra) = bra {
                bra.d.identifier = label;
            }

            if branch.dead {
                tracing::trace!(origin = %branch.origin, target = %target, "eliding never-taken branch");
                continue;
            }

            self.insert_edge(Edge::new(branch.origin, target, EdgeKind::Branch));
        }

        Ok(self.cfg)
    }
}

/// Splits a kernel body into basic blocks and connects them.
///
/// # Errors
/// Fails on the first structural defect found, see [`BuildError`].
pub fn build(statements: &[Statement]) -> Result<ControlFlowGraph, BuildError> {
    let mut builder = Builder::new();

    for (idx, statement) in statements.iter().enumerate() {
        match statement {
            Statement::Label(label) => builder.label(label, idx)?,
            Statement::Instruction(instruction) => builder.instruction(instruction, idx)?,
            Statement::Param(_) | Statement::Local(_) | Statement::Shared(_) | Statement::Entry(_) => {}
        }
    }

    let cfg = builder.finish()?;

    tracing::debug!(blocks = cfg.len(), edges = cfg.edges().len(), "built control flow graph");

    Ok(cfg)
}
