use super::diamond_module;
use crate::function::Signature;
use crate::instructions::{BinaryOp, IntCC};
use crate::types::Type;
use crate::values::{Constant, Value};
use crate::{FunctionBuilder, Interpreter, Module, RuntimeValue};

fn module_with_printf() -> Module {
    let mut module = Module::new("interp");
    module
        .declare_function(Signature::new("printf", vec![Type::byte_ptr()], Type::I32).variadic())
        .unwrap();
    module
}

#[test]
fn test_phi_follows_taken_branch() {
    let taken = Interpreter::new(&diamond_module(true)).run("main").unwrap();
    assert_eq!(taken.return_value, Some(RuntimeValue::Int(10)));

    let not_taken = Interpreter::new(&diamond_module(false)).run("main").unwrap();
    assert_eq!(not_taken.return_value, Some(RuntimeValue::Int(20)));
}

#[test]
fn test_ordered_comparisons_are_unsigned() {
    let mut module = Module::new("cmp");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I1));
    let result = fb
        .icmp(IntCC::UnsignedGreaterThan, Value::int(-1), Value::int(1))
        .unwrap();
    fb.ret(Some(result)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let outcome = Interpreter::new(&module).run("main").unwrap();
    assert_eq!(outcome.return_value, Some(RuntimeValue::Bool(true)));
}

#[test]
fn test_slots_and_globals_round_trip_through_memory() {
    let mut module = module_with_printf();
    let version = module.add_global("VERSION", Constant::Int(42)).unwrap();

    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let slot = fb.alloca("x", Type::I32).unwrap();
    let v = fb.load(Type::I32, Value::Global(version)).unwrap();
    let doubled = fb.binary(BinaryOp::Add, v.clone(), v).unwrap();
    fb.store(Value::Slot(slot), doubled).unwrap();
    fb.store(Value::Global(version), Value::int(7)).unwrap();
    let x = fb.load(Type::I32, Value::Slot(slot)).unwrap();
    let g = fb.load(Type::I32, Value::Global(version)).unwrap();
    let sum = fb.binary(BinaryOp::Add, x, g).unwrap();
    fb.ret(Some(sum)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let outcome = Interpreter::new(&module).run("main").unwrap();
    assert_eq!(outcome.return_value, Some(RuntimeValue::Int(91)));
}

#[test]
fn test_printf_output_is_captured() {
    let mut module = module_with_printf();
    let fmt = module.add_string("n=%d u=%u s=%s 100%%\n");
    let word = module.add_string("hi");

    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    fb.call(
        "printf",
        vec![Value::Str(fmt), Value::int(-2), Value::int(-1), Value::Str(word)],
    )
    .unwrap();
    fb.ret(Some(Value::int(0))).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let outcome = Interpreter::new(&module).run("main").unwrap();
    assert_eq!(outcome.output, "n=-2 u=4294967295 s=hi 100%\n");
    assert_eq!(outcome.return_value, Some(RuntimeValue::Int(0)));
}

#[test]
fn test_division_by_zero_is_an_error() {
    let mut module = Module::new("div");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let q = fb
        .binary(BinaryOp::SDiv, Value::int(1), Value::int(0))
        .unwrap();
    fb.ret(Some(q)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    assert!(Interpreter::new(&module).run("main").is_err());
}

#[test]
fn test_step_limit_stops_infinite_loops() {
    let mut module = Module::new("spin");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let spin = fb.create_block("spin");
    fb.jump(spin).unwrap();
    fb.switch_to_block(spin).unwrap();
    fb.jump(spin).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let err = Interpreter::new(&module)
        .with_step_limit(100)
        .run("main")
        .unwrap_err();
    assert!(err.to_string().contains("step limit"));
}
