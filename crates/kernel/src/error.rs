use std::fmt;

use ptxk_core::Opcode;

/// A structural defect in a kernel body, reported by [`build`](crate::build).
///
/// `statement` is the index of the offending statement within the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    DuplicateLabel { label: String, statement: usize },
    DuplicateExit { statement: usize },
    MissingExit,
    UndefinedLabel { label: String },
    UnsupportedControlFlow { opcode: Opcode, statement: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLabel { label, statement } => {
                write!(f, "duplicate blocks with label `{label}` (statement {statement})")
            }
            Self::DuplicateExit { statement } => {
                write!(f, "duplicate exit instruction (statement {statement})")
            }
            Self::MissingExit => f.write_str("no exit point from the kernel found"),
            Self::UndefinedLabel { label } => write!(f, "undefined label `{label}`"),
            Self::UnsupportedControlFlow { opcode, statement } => {
                write!(f, "unhandled control flow instruction `{opcode}` (statement {statement})")
            }
        }
    }
}

impl std::error::Error for BuildError {}
