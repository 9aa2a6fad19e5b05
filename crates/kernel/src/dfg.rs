use std::fmt;

use ptxk_core::{AddressMode, Instruction, Operand, RegisterId, Slot};

use crate::cfg::ControlFlowGraph;
use crate::id::BlockId;

/// Per-block register definitions and uses, plus the block's neighbours.
///
/// This is a snapshot of the graph it was built from and won't track later edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataflowBlock {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    /// Registers written in this block, in first-write order.
    pub defs: Vec<RegisterId>,
    /// Registers read in this block, in first-read order.
    pub uses: Vec<RegisterId>,
    pub predecessors: Vec<BlockId>,
    pub successors: Vec<BlockId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataflowGraph {
    blocks: Vec<DataflowBlock>,
}

fn push_registers(out: &mut Vec<RegisterId>, op: &Operand) {
    if !op.is_register_like() || op.is_always_true() || op.is_always_false() {
        return;
    }

    for scalar in op.scalars() {
        if !out.contains(&scalar.reg) {
            out.push(scalar.reg);
        }
    }
}

impl DataflowBlock {
    fn new(cfg: &ControlFlowGraph, id: BlockId, instructions: &[Instruction]) -> Self {
        let mut defs = Vec::new();
        let mut uses = Vec::new();

        for instruction in instructions {
            for slot in Slot::ALL {
                let op = instruction.operand(slot);

                let written = match slot {
                    // `[%r]` as a destination is an address, so the base gets read.
                    Slot::D => {
                        instruction.opcode.defines_destination() && op.mode != AddressMode::Indirect
                    }
                    Slot::Pq => true,
                    Slot::A | Slot::B | Slot::C | Slot::Pg => false,
                };

                match written {
                    true => push_registers(&mut defs, op),
                    false => push_registers(&mut uses, op),
                }
            }
        }

        Self {
            id,
            instructions: instructions.to_vec(),
            defs,
            uses,
            predecessors: cfg.predecessors(id).map(|edge| edge.head).collect(),
            successors: cfg.successors(id).map(|edge| edge.tail).collect(),
        }
    }
}

impl DataflowGraph {
    /// Snapshots `cfg`, which should already have had its registers assigned.
    #[must_use]
    pub fn new(cfg: &ControlFlowGraph) -> Self {
        let blocks: Vec<_> =
            cfg.blocks().map(|block| DataflowBlock::new(cfg, block.id, &block.instructions)).collect();

        tracing::debug!(blocks = blocks.len(), "built dataflow graph");

        Self { blocks }
    }

    /// Blocks in the same order as the graph they were built from.
    #[must_use]
    pub fn blocks(&self) -> &[DataflowBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&DataflowBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }
}

struct List<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, item) in self.0.iter().enumerate() {
            if idx != 0 {
                f.write_str(", ")?;
            }

            fmt::Display::fmt(item, f)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for DataflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(
                f,
                "{}: defs {} uses {} preds {} succs {}",
                block.id,
                List(&block.defs),
                List(&block.uses),
                List(&block.predecessors),
                List(&block.successors),
            )?;
        }

        Ok(())
    }
}
