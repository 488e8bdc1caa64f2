/*! Unified interface for the Eva compiler.
 *
 * One import for parsing Eva source, lowering it to IR, printing the result and running it on the
 * reference interpreter.
 */

pub use eva_core as core;
pub use eva_emit as emit;
pub use eva_lower as lower;
pub use eva_parser as parser;

pub use eva_core::{
    BasicBlock, BlockId, ExecOutcome, Function, Instruction, Interpreter, Module, Terminator, Type,
    Value,
};

pub use eva_emit::{EmitterConfig, IrEmitter};

pub use eva_parser::{parse_expr, parse_program, Expr};

pub use eva_lower::{compile_program, Compiler, CompilerOptions, LowerError};

/// Compiles `source` with default options and renders the module as plain text.
pub fn compile_to_text(source: &str) -> Result<String, LowerError> {
    let module = compile_program(source)?;
    Ok(IrEmitter::new(EmitterConfig::plain()).emit_module(&module))
}
