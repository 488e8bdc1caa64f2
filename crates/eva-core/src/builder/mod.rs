/*! Cursor-based construction of function bodies.
 *
 * `FunctionBuilder` owns the function being built together with its insertion cursor. The cursor
 * is ordinary data on the builder, so nothing about "the current block" lives outside the value
 * that the caller threads through its code.
 */

pub mod cursor;
pub mod function_builder;

pub use cursor::CursorPosition;
pub use function_builder::FunctionBuilder;
