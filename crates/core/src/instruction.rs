use core::fmt;

use crate::{DataType, Opcode, Operand};

/// One of the six operand slots of an [`Instruction`].
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Slot {
    D,
    A,
    B,
    C,
    Pg,
    Pq,
}

impl Slot {
    /// Every slot, destination first.
    ///
    /// Register numbering follows this order, so it must never change.
    pub const ALL: [Self; 6] = [Self::D, Self::A, Self::B, Self::C, Self::Pg, Self::Pq];
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Everything between the opcode and the type, verbatim, `.lt`, `.global`, `.uni`...
    pub modifiers: String,
    pub ty: Option<DataType>,
    pub d: Operand,
    pub a: Operand,
    pub b: Operand,
    pub c: Operand,
    /// Guard predicate.
    pub pg: Operand,
    /// Secondary predicate destination (`setp`).
    pub pq: Operand,
}

impl Instruction {
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            modifiers: String::new(),
            ty: None,
            d: Operand::invalid(),
            a: Operand::invalid(),
            b: Operand::invalid(),
            c: Operand::invalid(),
            pg: Operand::always_true(),
            pq: Operand::invalid(),
        }
    }

    /// An unconditional `bra.uni` to `target`.
    #[must_use]
    pub fn branch(target: impl Into<String>) -> Self {
        Self { modifiers: ".uni".to_owned(), d: Operand::label(target), ..Self::new(Opcode::Bra) }
    }

    #[must_use]
    pub fn with_type(self, ty: DataType) -> Self {
        Self { ty: Some(ty), ..self }
    }

    #[must_use]
    pub fn with_modifiers(self, modifiers: impl Into<String>) -> Self {
        Self { modifiers: modifiers.into(), ..self }
    }

    #[must_use]
    pub fn with_guard(self, pg: Operand) -> Self {
        Self { pg, ..self }
    }

    #[must_use]
    pub fn operand(&self, slot: Slot) -> &Operand {
        match slot {
            Slot::D => &self.d,
            Slot::A => &self.a,
            Slot::B => &self.b,
            Slot::C => &self.c,
            Slot::Pg => &self.pg,
            Slot::Pq => &self.pq,
        }
    }

    pub fn operand_mut(&mut self, slot: Slot) -> &mut Operand {
        match slot {
            Slot::D => &mut self.d,
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
            Slot::C => &mut self.c,
            Slot::Pg => &mut self.pg,
            Slot::Pq => &mut self.pq,
        }
    }

    pub fn set_operand(&mut self, slot: Slot, op: Operand) {
        *self.operand_mut(slot) = op;
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pg.display_guard(), self.opcode, self.modifiers)?;

        if let Some(ty) = self.ty {
            write!(f, ".{ty}")?;
        }

        let mut first = true;
        for slot in [Slot::D, Slot::A, Slot::B, Slot::C] {
            let op = self.operand(slot);
            if !op.is_valid() {
                continue;
            }

            f.write_str(if first { " " } else { ", " })?;
            first = false;

            fmt::Display::fmt(op, f)?;

            if slot == Slot::D && self.pq.is_valid() {
                write!(f, "|{}", self.pq)?;
            }
        }

        Ok(())
    }
}
