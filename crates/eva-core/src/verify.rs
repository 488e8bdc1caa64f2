//! Structural checks run on finished functions before a module is handed out.

use crate::{
    block::Terminator,
    function::{Function, FunctionBody},
    instructions::Instruction,
    module::Module,
    types::Type,
    values::{Value, ValueId},
    IrError, Result,
};
use std::collections::HashSet;

pub fn verify_module(module: &Module) -> Result<()> {
    for function in module.defined_functions() {
        verify_function(function, module)?;
    }
    Ok(())
}

pub fn verify_function(function: &Function, module: &Module) -> Result<()> {
    let body = function.body()?;
    let fail = |message: String| IrError::VerifyError {
        function: function.name().to_string(),
        message,
    };

    if body.layout.len() != body.blocks.len() {
        return Err(fail(format!(
            "layout lists {} blocks but the function has {}",
            body.layout.len(),
            body.blocks.len()
        )));
    }

    let defined: HashSet<ValueId> = body
        .blocks
        .values()
        .flat_map(|b| &b.instructions)
        .filter_map(Instruction::result)
        .collect();

    for block in body.blocks_in_layout() {
        match &block.terminator {
            Terminator::Invalid => {
                return Err(fail(format!("{} ({}) is not terminated", block.id, block.name)));
            }
            Terminator::Return(value) => match (&function.signature.ret, value) {
                (Type::Void, Some(_)) => {
                    return Err(fail(format!("{} returns a value from a void function", block.id)))
                }
                (ty, None) if *ty != Type::Void => {
                    return Err(fail(format!("{} returns nothing from a {} function", block.id, ty)))
                }
                (_, Some(value)) => check_operand(value, body, module, &defined).map_err(&fail)?,
                _ => {}
            },
            Terminator::Branch { condition, .. } => {
                check_operand(condition, body, module, &defined).map_err(&fail)?;
            }
            Terminator::Jump(_) => {}
        }

        for target in block.successors() {
            if body.get_block(target).is_none() {
                return Err(fail(format!("{} branches to missing {}", block.id, target)));
            }
        }

        let mut seen_non_phi = false;
        for inst in &block.instructions {
            if inst.is_phi() {
                if seen_non_phi {
                    return Err(fail(format!("phi after a non-phi instruction in {}", block.id)));
                }
                check_phi(inst, block.id, body).map_err(&fail)?;
            } else {
                seen_non_phi = true;
            }

            if inst.is_alloca() && block.id != body.entry_block() {
                return Err(fail(format!("alloca outside the entry block in {}", block.id)));
            }

            for operand in inst.operands() {
                check_operand(operand, body, module, &defined).map_err(&fail)?;
            }

            if let Instruction::Call { callee, args, .. } = inst {
                let target = module
                    .get_function(callee)
                    .ok_or_else(|| fail(format!("call to undeclared function {}", callee)))?;
                if !target.signature.accepts_arity(args.len()) {
                    return Err(fail(format!(
                        "call to {} with {} arguments",
                        callee,
                        args.len()
                    )));
                }
            }
        }
    }

    Ok(())
}

fn check_phi(inst: &Instruction, block: crate::block::BlockId, body: &FunctionBody) -> std::result::Result<(), String> {
    let Instruction::Phi { incoming, .. } = inst else {
        return Ok(());
    };
    let preds = body.predecessors(block);

    for (_, from) in incoming {
        if !preds.contains(from) {
            return Err(format!("phi in {} names {} which is not a predecessor", block, from));
        }
    }
    for pred in &preds {
        if !incoming.iter().any(|(_, from)| from == pred) {
            return Err(format!("phi in {} has no incoming value for {}", block, pred));
        }
    }
    Ok(())
}

fn check_operand(
    value: &Value,
    body: &FunctionBody,
    module: &Module,
    defined: &HashSet<ValueId>,
) -> std::result::Result<(), String> {
    match value {
        Value::Temp(id) if !defined.contains(id) => Err(format!("use of undefined value {}", id)),
        Value::Slot(slot) if body.slot(*slot).is_none() => Err(format!("use of unknown slot {}", slot)),
        Value::Global(id) if module.global(*id).is_none() => Err(format!("use of unknown global {}", id)),
        Value::Str(id) if module.string(*id).is_none() => Err(format!("use of unknown string {}", id)),
        Value::Function(name) if module.get_function(name).is_none() => {
            Err(format!("reference to unknown function {}", name))
        }
        _ => Ok(()),
    }
}
