use crate::block::{BasicBlock, BlockId};
use crate::types::Type;
use crate::values::{SlotId, ValueId};
use crate::{IrError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub signature: Signature,
    /// `None` for extern declarations.
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            body: Some(FunctionBody::new()),
        }
    }

    pub fn declaration(signature: Signature) -> Self {
        Self {
            signature,
            body: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }

    pub fn body(&self) -> Result<&FunctionBody> {
        self.body.as_ref().ok_or_else(|| {
            IrError::BuilderError(format!("Function {} has no body", self.signature.name))
        })
    }

    pub fn body_mut(&mut self) -> Result<&mut FunctionBody> {
        let name = self.signature.name.clone();
        self.body
            .as_mut()
            .ok_or_else(|| IrError::BuilderError(format!("Function {} has no body", name)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    pub variadic: bool,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.params.len()
        } else {
            count == self.params.len()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSlot {
    pub id: SlotId,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBody {
    pub entry_block: BlockId,
    pub blocks: IndexMap<BlockId, BasicBlock>,
    /// Order in which blocks are laid out, independent of creation order.
    pub layout: Vec<BlockId>,
    pub slots: Vec<StackSlot>,
    next_block_id: u32,
    next_value_id: u32,
}

impl FunctionBody {
    pub fn new() -> Self {
        let entry_block = BlockId(0);
        let mut blocks = IndexMap::new();
        blocks.insert(entry_block, BasicBlock::new(entry_block, "entry"));

        Self {
            entry_block,
            blocks,
            layout: vec![entry_block],
            slots: Vec::new(),
            next_block_id: 1,
            next_value_id: 0,
        }
    }

    /// Creates a block and appends it to the end of the layout.
    pub fn create_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, BasicBlock::new(id, name));
        self.layout.push(id);
        id
    }

    pub fn get_block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(&id)
    }

    pub fn get_block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(&id)
    }

    pub fn entry_block(&self) -> BlockId {
        self.entry_block
    }

    pub fn new_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value_id);
        self.next_value_id += 1;
        id
    }

    pub fn value_count(&self) -> u32 {
        self.next_value_id
    }

    pub fn add_slot(&mut self, name: impl Into<String>, ty: Type) -> SlotId {
        let id = SlotId(self.slots.len() as u32);
        self.slots.push(StackSlot {
            id,
            name: name.into(),
            ty,
        });
        id
    }

    pub fn slot(&self, id: SlotId) -> Option<&StackSlot> {
        self.slots.get(id.0 as usize)
    }

    /// Moves `block` so that it is laid out immediately after `after`.
    pub fn move_block_after(&mut self, block: BlockId, after: BlockId) -> Result<()> {
        if block == after {
            return Ok(());
        }
        let from = self
            .layout
            .iter()
            .position(|b| *b == block)
            .ok_or_else(|| IrError::BuilderError(format!("Block {} is not laid out", block)))?;
        let anchor = self
            .layout
            .iter()
            .position(|b| *b == after)
            .ok_or_else(|| IrError::BuilderError(format!("Block {} is not laid out", after)))?;

        self.layout.remove(from);
        let anchor = if from < anchor { anchor - 1 } else { anchor };
        self.layout.insert(anchor + 1, block);
        Ok(())
    }

    pub fn blocks_in_layout(&self) -> impl Iterator<Item = &BasicBlock> {
        self.layout.iter().filter_map(|id| self.blocks.get(id))
    }

    pub fn predecessors(&self, target: BlockId) -> Vec<BlockId> {
        self.blocks_in_layout()
            .filter(|b| b.successors().contains(&target))
            .map(|b| b.id)
            .collect()
    }
}

impl Default for FunctionBody {
    fn default() -> Self {
        Self::new()
    }
}
