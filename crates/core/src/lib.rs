#![forbid(unsafe_code)]
#![warn(clippy::must_use_candidate)]

pub mod instruction;
pub mod opcode;
pub mod operand;
mod statement;
mod ty;

pub use instruction::{Instruction, Slot};
pub use opcode::Opcode;
pub use operand::{AddressMode, Operand, PredicateCondition, RegisterId};
pub use statement::{Parameter, StateSpace, Statement, Variable};
pub use ty::DataType;
