/*! Core SSA IR types and builders for the Eva compiler.
 *
 * Functions are made of basic blocks with an explicit layout order, values are numbered per
 * function, and control-flow joins are expressed with phi nodes. The builder keeps the insertion
 * cursor as plain data so the lowering engine can thread it through its recursion, and the
 * interpreter executes finished modules so lowering can be checked end to end.
 */

pub mod block;
pub mod builder;
pub mod function;
pub mod instructions;
pub mod interp;
pub mod ir_persist;
pub mod module;
pub mod types;
pub mod values;
pub mod verify;

pub use block::{BasicBlock, BlockId, Terminator};
pub use builder::{CursorPosition, FunctionBuilder};
pub use function::{Function, FunctionBody, Signature, StackSlot};
pub use instructions::{BinaryOp, Instruction, IntCC};
pub use interp::{ExecOutcome, Interpreter, RuntimeValue};
pub use module::{GlobalVariable, Module, StringConstant};
pub use types::Type;
pub use values::{Constant, GlobalId, SlotId, StrId, Value, ValueId};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Verification failed in function `{function}`: {message}")]
    VerifyError { function: String, message: String },
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),
    #[error("Execution error: {0}")]
    ExecError(String),
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;
