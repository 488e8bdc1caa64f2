/*! Lower Eva programs into SSA IR.
 *
 * The lowering engine walks the expression tree once, emitting instructions through a
 * `FunctionBuilder` whose cursor it moves explicitly. Names resolve through a chain of
 * stack-allocated environments; each binding records whether it is a stack slot, a global, or a
 * plain value when it is declared, so loads and stores never have to inspect values at runtime.
 */

pub mod compiler;
pub mod env;
pub mod errors;
pub mod lowering;
pub mod type_resolver;

pub use compiler::{printf_signature, Compiler, CompilerOptions, GlobalDecl};
pub use env::{Binding, Environment};
pub use errors::{LowerError, LowerResult};
pub use lowering::Lowering;
pub use type_resolver::TypeResolver;

use eva_core::Module;

/// Compiles `source` with the default options.
pub fn compile_program(source: &str) -> LowerResult<Module> {
    Compiler::default().compile(source)
}
