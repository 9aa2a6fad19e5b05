//! Working out which `.reg` declarations a kernel needs.
//!
//! There are two ways of doing this and they disagree when one register is used with
//! several types: without a dataflow graph the last definition decides the type, with one
//! the first occurrence does.

use std::collections::BTreeMap;
use std::fmt;

use fnv::FnvHashSet;
use ptxk_core::{AddressMode, DataType, Instruction, Opcode, Operand, RegisterId};

use crate::cfg::ControlFlowGraph;
use crate::dfg::DataflowGraph;


/// A register that needs declaring.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Register {
    pub id: RegisterId,
    pub ty: DataType,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            DataType::Pred => write!(f, ".reg .pred %p{};", self.id),
            ty => write!(f, ".reg .{ty} %r{};", self.id),
        }
    }
}

fn record_read(registers: &mut BTreeMap<RegisterId, DataType>, op: &Operand) {
    if !op.is_register_like() {
        return;
    }

    for scalar in op.scalars() {
        registers.entry(scalar.reg).or_insert(scalar.ty);
    }
}

fn record_definition(registers: &mut BTreeMap<RegisterId, DataType>, op: &Operand) {
    for scalar in op.scalars() {
        registers.insert(scalar.reg, scalar.ty);
    }
}

/// Declarations for every register `cfg` mentions, in id order.
///
/// A definition overwrites whatever type was recorded before it, a read only fills in
/// registers nothing has mentioned yet (registers can be read before they're written).
#[must_use]
pub fn referenced_registers_without_dfg(cfg: &ControlFlowGraph) -> Vec<Register> {
    let mut registers = BTreeMap::new();

    for instruction in cfg.blocks().flat_map(|block| &block.instructions) {
        let d = &instruction.d;
        match instruction.opcode.defines_destination() && d.is_register_like() {
            true => record_definition(&mut registers, d),
            false => record_read(&mut registers, d),
        }

        for op in [&instruction.a, &instruction.b, &instruction.c] {
            record_read(&mut registers, op);
        }

        if instruction.opcode == Opcode::Setp && instruction.pq.mode == AddressMode::Register {
            record_definition(&mut registers, &instruction.pq);
        }
    }

    registers.into_iter().map(|(id, ty)| Register { id, ty }).collect()
}

fn inspected_operands(instruction: &Instruction) -> impl Iterator<Item = &Operand> {
    let ops = match instruction.opcode {
        Opcode::Bfi => [Some(&instruction.d), None, None],
        _ => [Some(&instruction.pq), Some(&instruction.d), Some(&instruction.a)],
    };

    ops.into_iter().flatten()
}

#[derive(Default)]
struct OrderedRegisters {
    predicates: FnvHashSet<RegisterId>,
    values: FnvHashSet<RegisterId>,
    out: Vec<Register>,
}

impl OrderedRegisters {
    fn record(&mut self, op: &Operand) {
        let (seen, other) = match op.is_predicate() {
            true => (&mut self.predicates, &self.values),
            false => (&mut self.values, &self.predicates),
        };

        if seen.insert(op.reg) && !other.contains(&op.reg) {
            self.out.push(Register { id: op.reg, ty: op.ty });
        }
    }
}

/// Declarations for every register `dfg` defines or reads through `a`, in first-seen order.
///
/// The first occurrence of a register decides its type. Stores are skipped entirely.
#[must_use]
pub fn referenced_registers(dfg: &DataflowGraph) -> Vec<Register> {
    let mut registers = OrderedRegisters::default();

    let instructions = dfg.blocks().iter().flat_map(|block| &block.instructions);
    for instruction in instructions.filter(|it| it.opcode != Opcode::St) {
        let ops = inspected_operands(instruction);
        for op in ops.filter(|op| op.mode == AddressMode::Register) {
            match op.is_predicate() {
                true => registers.record(op),
                false => op.scalars().for_each(|scalar| registers.record(scalar)),
            }
        }
    }

    registers.out
}
