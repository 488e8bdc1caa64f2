use super::diamond_module;
use crate::block::BlockId;
use crate::function::Signature;
use crate::types::Type;
use crate::values::{Value, ValueId};
use crate::verify::{verify_function, verify_module};
use crate::{FunctionBuilder, IrError, Module};

#[test]
fn test_diamond_verifies() {
    let module = diamond_module(true);
    verify_module(&module).unwrap();
}

#[test]
fn test_phi_with_non_predecessor_is_rejected() {
    let mut module = Module::new("bad_phi");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let a = fb.create_block("a");
    let b = fb.create_block("b");
    fb.jump(a).unwrap();

    fb.switch_to_block(a).unwrap();
    fb.jump(b).unwrap();

    fb.switch_to_block(b).unwrap();
    let merged = fb
        .phi(Type::I32, vec![(Value::int(1), BlockId(0))])
        .unwrap();
    fb.ret(Some(merged)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let function = module.get_function("main").unwrap();
    let err = verify_function(function, &module).unwrap_err();
    assert!(matches!(err, IrError::VerifyError { .. }));
    assert!(err.to_string().contains("not a predecessor"));
}

#[test]
fn test_use_of_undefined_value_is_rejected() {
    let mut module = Module::new("undefined");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    fb.ret(Some(Value::Temp(ValueId(9)))).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("undefined value v9"));
}

#[test]
fn test_call_to_undeclared_function_is_rejected() {
    let mut module = Module::new("calls");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let result = fb.call("puts", vec![Value::int(1)]).unwrap();
    fb.ret(Some(result)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("undeclared function puts"));
}

#[test]
fn test_variadic_call_needs_fixed_params() {
    let mut module = Module::new("variadic");
    module
        .declare_function(Signature::new("printf", vec![Type::byte_ptr()], Type::I32).variadic())
        .unwrap();
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    let result = fb.call("printf", vec![]).unwrap();
    fb.ret(Some(result)).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    assert!(verify_module(&module).is_err());
}

#[test]
fn test_return_without_value_from_i32_function() {
    let mut module = Module::new("ret");
    let mut fb = FunctionBuilder::new(Signature::new("main", vec![], Type::I32));
    fb.ret(None).unwrap();
    module.define_function(fb.build().unwrap()).unwrap();

    assert!(verify_module(&module).is_err());
}
