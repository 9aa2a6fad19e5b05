use core::fmt;

use crate::DataType;

/// Dense virtual register number, only meaningful once registers have been assigned.
pub type RegisterId = u32;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Default)]
pub enum AddressMode {
    Register,
    /// `[%r+offset]`
    Indirect,
    Immediate,
    /// `[symbol+offset]`
    Address,
    /// A branch or call target.
    Label,
    /// Read-only hardware registers such as `%tid.x`, never allocated.
    Special,
    #[default]
    Invalid,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Default)]
pub enum PredicateCondition {
    AlwaysTrue,
    AlwaysFalse,
    #[default]
    Pred,
    InvPred,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Operand {
    pub mode: AddressMode,
    /// The symbolic name, cleared once a register id has been assigned.
    pub identifier: String,
    pub reg: RegisterId,
    pub ty: DataType,
    /// Elements of a vector operand (`{%r1, %r2}`), empty for scalars.
    pub array: Vec<Operand>,
    pub condition: PredicateCondition,
    pub offset: i32,
    pub imm: i64,
}

impl Operand {
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(name: impl Into<String>, ty: DataType) -> Self {
        Self { mode: AddressMode::Register, identifier: name.into(), ty, ..Self::default() }
    }

    #[must_use]
    pub fn predicate(name: impl Into<String>) -> Self {
        Self::register(name, DataType::Pred)
    }

    #[must_use]
    pub fn always_true() -> Self {
        Self {
            mode: AddressMode::Register,
            ty: DataType::Pred,
            condition: PredicateCondition::AlwaysTrue,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn always_false() -> Self {
        Self { condition: PredicateCondition::AlwaysFalse, ..Self::always_true() }
    }

    /// Flips a guard predicate, `@%p` <-> `@!%p`, `pt` <-> `!pt`.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.condition = match self.condition {
            PredicateCondition::AlwaysTrue => PredicateCondition::AlwaysFalse,
            PredicateCondition::AlwaysFalse => PredicateCondition::AlwaysTrue,
            PredicateCondition::Pred => PredicateCondition::InvPred,
            PredicateCondition::InvPred => PredicateCondition::Pred,
        };

        self
    }

    #[must_use]
    pub fn immediate(imm: i64, ty: DataType) -> Self {
        Self { mode: AddressMode::Immediate, imm, ty, ..Self::default() }
    }

    #[must_use]
    pub fn label(name: impl Into<String>) -> Self {
        Self { mode: AddressMode::Label, identifier: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn indirect(base: impl Into<String>, offset: i32, ty: DataType) -> Self {
        Self { mode: AddressMode::Indirect, identifier: base.into(), offset, ty, ..Self::default() }
    }

    #[must_use]
    pub fn address(symbol: impl Into<String>, offset: i32, ty: DataType) -> Self {
        Self { mode: AddressMode::Address, identifier: symbol.into(), offset, ty, ..Self::default() }
    }

    #[must_use]
    pub fn special(name: impl Into<String>, ty: DataType) -> Self {
        Self { mode: AddressMode::Special, identifier: name.into(), ty, ..Self::default() }
    }

    /// # Panics
    /// Panics if `elements` is empty.
    #[must_use]
    pub fn vector(elements: Vec<Operand>) -> Self {
        assert!(!elements.is_empty(), "vector operands need at least one element");

        Self {
            mode: AddressMode::Register,
            ty: elements[0].ty,
            array: elements,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !matches!(self.mode, AddressMode::Invalid)
    }

    /// Register and indirect operands both name a register (the latter as a base address).
    #[must_use]
    pub const fn is_register_like(&self) -> bool {
        matches!(self.mode, AddressMode::Register | AddressMode::Indirect)
    }

    /// A `{...}` operand, registers live in `array` rather than in the operand itself.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        !self.array.is_empty()
    }

    /// Each element of a vector operand, or the operand itself for scalars.
    #[must_use]
    pub fn scalars(&self) -> std::slice::Iter<'_, Operand> {
        match self.is_vector() {
            true => self.array.iter(),
            false => std::slice::from_ref(self).iter(),
        }
    }

    pub fn scalars_mut(&mut self) -> std::slice::IterMut<'_, Operand> {
        match self.is_vector() {
            true => self.array.iter_mut(),
            false => std::slice::from_mut(self).iter_mut(),
        }
    }

    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        self.ty.is_predicate()
    }

    #[must_use]
    pub fn is_always_true(&self) -> bool {
        self.is_predicate() && self.condition == PredicateCondition::AlwaysTrue
    }

    #[must_use]
    pub fn is_always_false(&self) -> bool {
        self.is_predicate() && self.condition == PredicateCondition::AlwaysFalse
    }

    fn fmt_register(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.identifier.is_empty(), self.is_predicate()) {
            (false, _) => f.write_str(&self.identifier),
            (true, true) => write!(f, "%p{}", self.reg),
            (true, false) => write!(f, "%r{}", self.reg),
        }
    }

    fn fmt_offset(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            0 => Ok(()),
            offset if offset < 0 => write!(f, "{offset}"),
            offset => write!(f, "+{offset}"),
        }
    }

    /// Renders a guard, including the trailing space, `@%p0 ` / `@!%p0 `.
    ///
    /// Always-true guards render as nothing.
    #[must_use]
    pub fn display_guard(&self) -> GuardDisplay<'_> {
        GuardDisplay(self)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            AddressMode::Register if !self.array.is_empty() => {
                f.write_str("{")?;
                for (idx, element) in self.array.iter().enumerate() {
                    if idx != 0 {
                        f.write_str(", ")?;
                    }

                    fmt::Display::fmt(element, f)?;
                }
                f.write_str("}")
            }
            AddressMode::Register => self.fmt_register(f),
            AddressMode::Indirect => {
                f.write_str("[")?;
                self.fmt_register(f)?;
                self.fmt_offset(f)?;
                f.write_str("]")
            }
            AddressMode::Address => {
                write!(f, "[{}", self.identifier)?;
                self.fmt_offset(f)?;
                f.write_str("]")
            }
            AddressMode::Immediate => write!(f, "{}", self.imm),
            AddressMode::Label | AddressMode::Special => f.write_str(&self.identifier),
            AddressMode::Invalid => Ok(()),
        }
    }
}

pub struct GuardDisplay<'a>(&'a Operand);

impl fmt::Display for GuardDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.0;

        if !guard.is_valid() {
            return Ok(());
        }

        match guard.condition {
            PredicateCondition::AlwaysTrue => Ok(()),
            PredicateCondition::AlwaysFalse => f.write_str("@!pt "),
            PredicateCondition::Pred => {
                f.write_str("@")?;
                guard.fmt_register(f)?;
                f.write_str(" ")
            }
            PredicateCondition::InvPred => {
                f.write_str("@!")?;
                guard.fmt_register(f)?;
                f.write_str(" ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Operand;
    use crate::DataType;

    #[test]
    fn registers_render_by_name_then_by_id() {
        let mut op = Operand::register("%r7", DataType::S32);
        assert_eq!(op.to_string(), "%r7");

        op.reg = 3;
        op.identifier.clear();
        assert_eq!(op.to_string(), "%r3");

        let mut p = Operand::predicate("%p9");
        p.reg = 0;
        p.identifier.clear();
        assert_eq!(p.to_string(), "%p0");
    }

    #[test]
    fn memory_operands() {
        assert_eq!(Operand::indirect("%r1", 8, DataType::U32).to_string(), "[%r1+8]");
        assert_eq!(Operand::indirect("%r1", -4, DataType::U32).to_string(), "[%r1-4]");
        assert_eq!(Operand::address("buf", 0, DataType::U32).to_string(), "[buf]");
    }

    #[test]
    fn guards() {
        assert_eq!(Operand::always_true().display_guard().to_string(), "");
        assert_eq!(Operand::always_false().display_guard().to_string(), "@!pt ");
        assert_eq!(Operand::predicate("%p1").display_guard().to_string(), "@%p1 ");
        assert_eq!(Operand::predicate("%p1").negated().display_guard().to_string(), "@!%p1 ");
        assert!(Operand::always_true().negated().is_always_false());
    }

    #[test]
    fn vectors() {
        let v = Operand::vector(vec![
            Operand::register("%f1", DataType::F32),
            Operand::register("%f2", DataType::F32),
        ]);

        assert!(v.is_vector());
        assert_eq!(v.ty, DataType::F32);
        assert_eq!(v.scalars().map(|it| it.identifier.as_str()).collect::<Vec<_>>(), ["%f1", "%f2"]);

        let scalar = Operand::register("%r1", DataType::U32);
        assert_eq!(scalar.scalars().count(), 1);
        assert_eq!(v.to_string(), "{%f1, %f2}");
    }
}
