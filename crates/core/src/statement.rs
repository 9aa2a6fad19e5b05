use core::fmt;

use crate::{DataType, Instruction};

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum StateSpace {
    Local,
    Shared,
}

impl fmt::Display for StateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str(".local"),
            Self::Shared => f.write_str(".shared"),
        }
    }
}

/// A kernel parameter, `.param .u32 n`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: DataType,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".param .{} {}", self.ty, self.name)
    }
}

/// A `.local` or `.shared` variable declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Variable {
    pub space: StateSpace,
    pub name: String,
    pub ty: DataType,
    pub align: Option<u32>,
    /// Element count for array variables, `buf[64]`.
    pub elements: Option<u32>,
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.space)?;

        if let Some(align) = self.align {
            write!(f, " .align {align}")?;
        }

        write!(f, " .{} {}", self.ty, self.name)?;

        if let Some(elements) = self.elements {
            write!(f, "[{elements}]")?;
        }

        f.write_str(";")
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    Label(String),
    Instruction(Instruction),
    Param(Parameter),
    Local(Variable),
    Shared(Variable),
    /// Names the kernel.
    Entry(String),
}
