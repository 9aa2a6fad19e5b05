// these opcode names are _exact_, and naming rules don't apply to them

use core::fmt;
use core::str::FromStr;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Opcode {
    Abs,
    Add,
    And,
    Bar,
    Bfi,
    Bra,
    Call,
    Cvt,
    Cvta,
    Div,
    Exit,
    Ld,
    Mad,
    Max,
    Min,
    Mov,
    Mul,
    Neg,
    Not,
    Or,
    Rem,
    Ret,
    Selp,
    Setp,
    Shl,
    Shr,
    St,
    Sub,
    Xor,
}

impl Opcode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Add => "add",
            Self::And => "and",
            Self::Bar => "bar",
            Self::Bfi => "bfi",
            Self::Bra => "bra",
            Self::Call => "call",
            Self::Cvt => "cvt",
            Self::Cvta => "cvta",
            Self::Div => "div",
            Self::Exit => "exit",
            Self::Ld => "ld",
            Self::Mad => "mad",
            Self::Max => "max",
            Self::Min => "min",
            Self::Mov => "mov",
            Self::Mul => "mul",
            Self::Neg => "neg",
            Self::Not => "not",
            Self::Or => "or",
            Self::Rem => "rem",
            Self::Ret => "ret",
            Self::Selp => "selp",
            Self::Setp => "setp",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::St => "st",
            Self::Sub => "sub",
            Self::Xor => "xor",
        }
    }

    /// Opcodes that end a basic block.
    #[must_use]
    pub const fn is_control_flow(self) -> bool {
        matches!(self, Self::Bra | Self::Exit | Self::Call | Self::Ret)
    }

    /// Whether `d` is written by this opcode.
    ///
    /// Branches and stores only *read* their `d` slot (a label / the address being stored to).
    #[must_use]
    pub const fn defines_destination(self) -> bool {
        !matches!(self, Self::Bra | Self::St)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "abs" => Self::Abs,
            "add" => Self::Add,
            "and" => Self::And,
            "bar" => Self::Bar,
            "bfi" => Self::Bfi,
            "bra" => Self::Bra,
            "call" => Self::Call,
            "cvt" => Self::Cvt,
            "cvta" => Self::Cvta,
            "div" => Self::Div,
            "exit" => Self::Exit,
            "ld" => Self::Ld,
            "mad" => Self::Mad,
            "max" => Self::Max,
            "min" => Self::Min,
            "mov" => Self::Mov,
            "mul" => Self::Mul,
            "neg" => Self::Neg,
            "not" => Self::Not,
            "or" => Self::Or,
            "rem" => Self::Rem,
            "ret" => Self::Ret,
            "selp" => Self::Selp,
            "setp" => Self::Setp,
            "shl" => Self::Shl,
            "shr" => Self::Shr,
            "st" => Self::St,
            "sub" => Self::Sub,
            "xor" => Self::Xor,
            _ => return Err(()),
        };

        Ok(op)
    }
}
