//! Reference interpreter for finished modules.
//!
//! Executes a function block by block, resolving phis by the predecessor that
//! control came from. Arithmetic wraps at 32 bits and ordered comparisons are
//! unsigned, matching the instructions' definitions. The only extern it knows
//! is `printf`, whose output is captured instead of written to stdout.

use crate::{
    block::{BlockId, Terminator},
    instructions::{BinaryOp, Instruction},
    module::Module,
    values::{Constant, GlobalId, SlotId, StrId, Value, ValueId},
    IrError, Result,
};
use std::collections::HashMap;

const DEFAULT_STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Slot(SlotId),
    Global(GlobalId),
    Str(StrId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeValue {
    Int(i32),
    Bool(bool),
    Ptr(Pointer),
}

impl RuntimeValue {
    pub fn as_i32(&self) -> Result<i32> {
        match self {
            RuntimeValue::Int(v) => Ok(*v),
            RuntimeValue::Bool(b) => Ok(*b as i32),
            RuntimeValue::Ptr(p) => Err(IrError::ExecError(format!(
                "expected an integer, found pointer {:?}",
                p
            ))),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            RuntimeValue::Int(v) => *v != 0,
            RuntimeValue::Bool(b) => *b,
            RuntimeValue::Ptr(_) => true,
        }
    }
}

impl From<Constant> for RuntimeValue {
    fn from(c: Constant) -> Self {
        match c {
            Constant::Bool(b) => RuntimeValue::Bool(b),
            Constant::Int(v) => RuntimeValue::Int(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub return_value: Option<RuntimeValue>,
    /// Everything written through `printf`.
    pub output: String,
    pub steps: usize,
}

#[derive(Default)]
struct Frame {
    values: HashMap<ValueId, RuntimeValue>,
    slots: HashMap<SlotId, RuntimeValue>,
}

pub struct Interpreter<'m> {
    module: &'m Module,
    globals: Vec<RuntimeValue>,
    output: String,
    steps: usize,
    step_limit: usize,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m Module) -> Self {
        let globals = module
            .globals
            .values()
            .map(|g| RuntimeValue::from(g.initializer))
            .collect();
        Self {
            module,
            globals,
            output: String::new(),
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn run(mut self, entry: &str) -> Result<ExecOutcome> {
        let return_value = self.call(entry, Vec::new())?;
        Ok(ExecOutcome {
            return_value,
            output: self.output,
            steps: self.steps,
        })
    }

    /// Current value of a module-level variable.
    pub fn global(&self, id: GlobalId) -> Option<RuntimeValue> {
        self.globals.get(id.0 as usize).copied()
    }

    fn call(&mut self, name: &str, args: Vec<RuntimeValue>) -> Result<Option<RuntimeValue>> {
        let module = self.module;
        let function = module
            .get_function(name)
            .ok_or_else(|| IrError::FunctionNotFound(name.to_string()))?;

        if !function.signature.accepts_arity(args.len()) {
            return Err(IrError::ExecError(format!(
                "{} called with {} arguments",
                name,
                args.len()
            )));
        }

        if function.is_declaration() {
            return self.call_extern(name, &args).map(Some);
        }

        let body = function.body()?;
        let mut frame = Frame::default();
        let mut block_id = body.entry_block();
        let mut came_from: Option<BlockId> = None;

        loop {
            let block = body
                .get_block(block_id)
                .ok_or_else(|| IrError::ExecError(format!("jump to missing {}", block_id)))?;

            for inst in &block.instructions {
                self.tick()?;
                self.execute(inst, &mut frame, came_from, block_id)?;
            }

            self.tick()?;
            match &block.terminator {
                Terminator::Jump(target) => {
                    came_from = Some(block_id);
                    block_id = *target;
                }
                Terminator::Branch {
                    condition,
                    then_block,
                    else_block,
                } => {
                    let taken = self.eval(condition, &frame)?.is_truthy();
                    came_from = Some(block_id);
                    block_id = if taken { *then_block } else { *else_block };
                }
                Terminator::Return(value) => {
                    return value.as_ref().map(|v| self.eval(v, &frame)).transpose();
                }
                Terminator::Invalid => {
                    return Err(IrError::ExecError(format!(
                        "fell off unterminated {}",
                        block_id
                    )));
                }
            }
        }
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(IrError::ExecError(format!(
                "step limit of {} exceeded",
                self.step_limit
            )));
        }
        Ok(())
    }

    fn execute(
        &mut self,
        inst: &Instruction,
        frame: &mut Frame,
        came_from: Option<BlockId>,
        current: BlockId,
    ) -> Result<()> {
        match inst {
            Instruction::Alloca { .. } => {}
            Instruction::Load {
                result, address, ..
            } => {
                let loaded = match self.eval(address, frame)? {
                    RuntimeValue::Ptr(Pointer::Slot(slot)) => {
                        frame.slots.get(&slot).copied().ok_or_else(|| {
                            IrError::ExecError(format!("load from uninitialized {}", slot))
                        })?
                    }
                    RuntimeValue::Ptr(Pointer::Global(id)) => self
                        .global(id)
                        .ok_or_else(|| IrError::ExecError(format!("load from unknown {}", id)))?,
                    other => {
                        return Err(IrError::ExecError(format!(
                            "load from non-variable address {:?}",
                            other
                        )))
                    }
                };
                frame.values.insert(*result, loaded);
            }
            Instruction::Store { address, value } => {
                let value = self.eval(value, frame)?;
                match self.eval(address, frame)? {
                    RuntimeValue::Ptr(Pointer::Slot(slot)) => {
                        frame.slots.insert(slot, value);
                    }
                    RuntimeValue::Ptr(Pointer::Global(id)) => {
                        let cell = self.globals.get_mut(id.0 as usize).ok_or_else(|| {
                            IrError::ExecError(format!("store to unknown {}", id))
                        })?;
                        *cell = value;
                    }
                    other => {
                        return Err(IrError::ExecError(format!(
                            "store to non-variable address {:?}",
                            other
                        )))
                    }
                }
            }
            Instruction::Binary {
                result,
                op,
                left,
                right,
            } => {
                let l = self.eval(left, frame)?.as_i32()?;
                let r = self.eval(right, frame)?.as_i32()?;
                let value = match op {
                    BinaryOp::Add => l.wrapping_add(r),
                    BinaryOp::Sub => l.wrapping_sub(r),
                    BinaryOp::Mul => l.wrapping_mul(r),
                    BinaryOp::SDiv => {
                        if r == 0 {
                            return Err(IrError::ExecError("division by zero".to_string()));
                        }
                        l.wrapping_div(r)
                    }
                };
                frame.values.insert(*result, RuntimeValue::Int(value));
            }
            Instruction::Icmp {
                result,
                cond,
                left,
                right,
            } => {
                let l = self.eval(left, frame)?.as_i32()? as u32;
                let r = self.eval(right, frame)?.as_i32()? as u32;
                frame
                    .values
                    .insert(*result, RuntimeValue::Bool(cond.evaluate(l, r)));
            }
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a, frame))
                    .collect::<Result<Vec<_>>>()?;
                let value = self.call(callee, args)?.ok_or_else(|| {
                    IrError::ExecError(format!("{} returned no value", callee))
                })?;
                frame.values.insert(*result, value);
            }
            Instruction::Phi {
                result, incoming, ..
            } => {
                let from = came_from.ok_or_else(|| {
                    IrError::ExecError(format!("phi in {} reached without a predecessor", current))
                })?;
                let (value, _) = incoming
                    .iter()
                    .find(|(_, block)| *block == from)
                    .ok_or_else(|| {
                        IrError::ExecError(format!("phi in {} has no entry for {}", current, from))
                    })?;
                let value = self.eval(value, frame)?;
                frame.values.insert(*result, value);
            }
        }
        Ok(())
    }

    fn eval(&self, value: &Value, frame: &Frame) -> Result<RuntimeValue> {
        match value {
            Value::Constant(c) => Ok(RuntimeValue::from(*c)),
            Value::Temp(id) => frame
                .values
                .get(id)
                .copied()
                .ok_or_else(|| IrError::ExecError(format!("use of unevaluated {}", id))),
            Value::Slot(slot) => Ok(RuntimeValue::Ptr(Pointer::Slot(*slot))),
            Value::Global(id) => Ok(RuntimeValue::Ptr(Pointer::Global(*id))),
            Value::Str(id) => Ok(RuntimeValue::Ptr(Pointer::Str(*id))),
            Value::Function(name) => Err(IrError::ExecError(format!(
                "function %{} used as a value",
                name
            ))),
        }
    }

    fn string(&self, value: RuntimeValue) -> Result<&'m str> {
        match value {
            RuntimeValue::Ptr(Pointer::Str(id)) => {
                let module = self.module;
                module
                    .string(id)
                    .map(|s| s.value.as_str())
                    .ok_or_else(|| IrError::ExecError(format!("unknown string {}", id)))
            }
            other => Err(IrError::ExecError(format!(
                "expected a string, found {:?}",
                other
            ))),
        }
    }

    fn call_extern(&mut self, name: &str, args: &[RuntimeValue]) -> Result<RuntimeValue> {
        match name {
            "printf" => {
                let format = self.string(args[0])?;
                let text = self.format_printf(format, &args[1..])?;
                self.output.push_str(&text);
                Ok(RuntimeValue::Int(text.len() as i32))
            }
            _ => Err(IrError::ExecError(format!(
                "no host implementation for extern {}",
                name
            ))),
        }
    }

    fn format_printf(&self, format: &str, args: &[RuntimeValue]) -> Result<String> {
        let mut out = String::new();
        let mut args = args.iter();
        let mut chars = format.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let spec = chars
                .next()
                .ok_or_else(|| IrError::ExecError("dangling % in format string".to_string()))?;
            if spec == '%' {
                out.push('%');
                continue;
            }
            let arg = *args.next().ok_or_else(|| {
                IrError::ExecError(format!("missing argument for %{}", spec))
            })?;
            match spec {
                'd' | 'i' => out.push_str(&arg.as_i32()?.to_string()),
                'u' => out.push_str(&(arg.as_i32()? as u32).to_string()),
                'x' => out.push_str(&format!("{:x}", arg.as_i32()? as u32)),
                'c' => out.push((arg.as_i32()? as u8) as char),
                's' => out.push_str(self.string(arg)?),
                other => {
                    return Err(IrError::ExecError(format!(
                        "unsupported conversion %{}",
                        other
                    )))
                }
            }
        }

        Ok(out)
    }
}
