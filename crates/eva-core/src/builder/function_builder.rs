use super::CursorPosition;
use crate::{
    block::{BlockId, Terminator},
    function::{Function, FunctionBody, Signature},
    instructions::{BinaryOp, Instruction, IntCC},
    types::Type,
    values::{SlotId, Value},
    IrError, Result,
};

pub struct FunctionBuilder {
    signature: Signature,
    body: FunctionBody,
    pub(crate) position: CursorPosition,
    /// Number of allocas already sunk to the top of the entry block.
    entry_allocas: usize,
}

impl FunctionBuilder {
    pub fn new(signature: Signature) -> Self {
        let body = FunctionBody::new();
        let entry = body.entry_block();
        Self {
            signature,
            body,
            position: CursorPosition::BlockEnd(entry),
            entry_allocas: 0,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut FunctionBody {
        &mut self.body
    }

    pub fn entry_block(&self) -> BlockId {
        self.body.entry_block()
    }

    pub fn create_block(&mut self, name: &str) -> BlockId {
        self.body.create_block(name)
    }

    pub fn switch_to_block(&mut self, block_id: BlockId) -> Result<()> {
        if self.body.get_block(block_id).is_none() {
            return Err(IrError::BuilderError(format!(
                "Block {} does not exist",
                block_id
            )));
        }
        self.goto_block_end(block_id);
        Ok(())
    }

    pub fn current_block(&self) -> Result<BlockId> {
        self.position.block().ok_or_else(|| {
            IrError::BuilderError("No current block - call switch_to_block first".into())
        })
    }

    pub fn move_block_after(&mut self, block: BlockId, after: BlockId) -> Result<()> {
        self.body.move_block_after(block, after)
    }

    pub fn is_terminated(&self) -> bool {
        self.position
            .block()
            .and_then(|b| self.body.get_block(b))
            .map(|b| b.is_terminated())
            .unwrap_or(false)
    }

    pub fn iconst(&self, value: i32) -> Value {
        Value::int(value)
    }

    pub fn bconst(&self, value: bool) -> Value {
        Value::bool(value)
    }

    pub fn binary(&mut self, op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        let result = self.body.new_value();
        self.insert_inst(Instruction::Binary {
            result,
            op,
            left,
            right,
        })?;
        Ok(Value::Temp(result))
    }

    pub fn icmp(&mut self, cond: IntCC, left: Value, right: Value) -> Result<Value> {
        let result = self.body.new_value();
        self.insert_inst(Instruction::Icmp {
            result,
            cond,
            left,
            right,
        })?;
        Ok(Value::Temp(result))
    }

    /// Allocates a stack slot at the top of the entry block, after earlier slots,
    /// regardless of where the cursor currently is.
    pub fn alloca(&mut self, name: &str, ty: Type) -> Result<SlotId> {
        let slot = self.body.add_slot(name, ty.clone());
        let saved = self.position;
        self.position = CursorPosition::Before(self.body.entry_block(), self.entry_allocas);
        let inserted = self.insert_inst(Instruction::Alloca {
            slot,
            ty,
            name: name.to_string(),
        });
        self.position = saved;
        inserted?;
        self.entry_allocas += 1;
        Ok(slot)
    }

    pub fn load(&mut self, ty: Type, address: Value) -> Result<Value> {
        let result = self.body.new_value();
        self.insert_inst(Instruction::Load {
            result,
            ty,
            address,
        })?;
        Ok(Value::Temp(result))
    }

    pub fn store(&mut self, address: Value, value: Value) -> Result<()> {
        self.insert_inst(Instruction::Store { address, value })
    }

    pub fn call(&mut self, callee: &str, args: Vec<Value>) -> Result<Value> {
        let result = self.body.new_value();
        self.insert_inst(Instruction::Call {
            result,
            callee: callee.to_string(),
            args,
        })?;
        Ok(Value::Temp(result))
    }

    pub fn phi(&mut self, ty: Type, incoming: Vec<(Value, BlockId)>) -> Result<Value> {
        let result = self.body.new_value();
        self.insert_inst(Instruction::Phi {
            result,
            ty,
            incoming,
        })?;
        Ok(Value::Temp(result))
    }

    pub fn jump(&mut self, target: BlockId) -> Result<()> {
        self.seal_with_terminator(Terminator::Jump(target))
    }

    pub fn branch(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> Result<()> {
        self.seal_with_terminator(Terminator::Branch {
            condition,
            then_block,
            else_block,
        })
    }

    pub fn ret(&mut self, value: Option<Value>) -> Result<()> {
        self.seal_with_terminator(Terminator::Return(value))
    }

    fn seal_with_terminator(&mut self, term: Terminator) -> Result<()> {
        let block_id = self.current_block()?;
        let block = self
            .body
            .get_block_mut(block_id)
            .ok_or_else(|| IrError::BuilderError(format!("Block {} not found", block_id)))?;
        if block.is_terminated() {
            return Err(IrError::BuilderError(format!(
                "Block {} is already terminated",
                block_id
            )));
        }
        block.set_terminator(term);
        Ok(())
    }

    pub fn build(self) -> Result<Function> {
        if let Some(open) = self.body.blocks.values().find(|b| !b.is_terminated()) {
            return Err(IrError::BuilderError(format!(
                "Block {} ({}) is not terminated",
                open.id, open.name
            )));
        }

        Ok(Function {
            signature: self.signature,
            body: Some(self.body),
        })
    }
}
