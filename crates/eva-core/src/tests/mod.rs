/*! Unit coverage for the IR builders, verifier and interpreter.
 *
 * Functions are assembled by hand here so each piece can be checked without going through the
 * parser or the lowering engine.
 */

mod interp_tests;
mod verify_tests;

use crate::{
    function::Signature,
    module::Module,
    types::Type,
    FunctionBuilder,
};

/// A module with `printf` declared and a `main` that returns `if cond then 10 else 20`.
pub(crate) fn diamond_module(cond: bool) -> Module {
    let mut module = Module::new("test");
    module
        .declare_function(Signature::new("printf", vec![Type::byte_ptr()], Type::I32).variadic())
        .unwrap();

    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let then_block = fb.create_block("then");
    let else_block = fb.create_block("else");
    let join = fb.create_block("ifend");

    let c = fb.bconst(cond);
    fb.branch(c, then_block, else_block).unwrap();

    fb.switch_to_block(then_block).unwrap();
    let ten = fb.iconst(10);
    fb.jump(join).unwrap();

    fb.switch_to_block(else_block).unwrap();
    let twenty = fb.iconst(20);
    fb.jump(join).unwrap();

    fb.switch_to_block(join).unwrap();
    let merged = fb
        .phi(Type::I32, vec![(ten, then_block), (twenty, else_block)])
        .unwrap();
    fb.ret(Some(merged)).unwrap();

    module.define_function(fb.build().unwrap()).unwrap();
    module
}
