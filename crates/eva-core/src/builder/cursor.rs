use super::FunctionBuilder;
use crate::{block::BlockId, instructions::Instruction, IrError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    None,
    BlockStart(BlockId),
    BlockEnd(BlockId),
    After(BlockId, usize),
    Before(BlockId, usize),
}

impl CursorPosition {
    pub fn block(&self) -> Option<BlockId> {
        match *self {
            CursorPosition::None => None,
            CursorPosition::BlockStart(b)
            | CursorPosition::BlockEnd(b)
            | CursorPosition::After(b, _)
            | CursorPosition::Before(b, _) => Some(b),
        }
    }
}

impl FunctionBuilder {
    pub fn goto_block_start(&mut self, block: BlockId) {
        self.position = CursorPosition::BlockStart(block);
    }

    pub fn goto_block_end(&mut self, block: BlockId) {
        self.position = CursorPosition::BlockEnd(block);
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// Inserts at the cursor and leaves the cursor after the new instruction.
    pub(crate) fn insert_inst(&mut self, inst: Instruction) -> Result<()> {
        let block_id = self
            .position
            .block()
            .ok_or_else(|| IrError::BuilderError("Cursor not positioned".to_string()))?;
        let position = self.position;

        let block = self
            .body_mut()
            .get_block_mut(block_id)
            .ok_or_else(|| IrError::BuilderError(format!("Block {} not found", block_id)))?;

        if block.is_terminated() && matches!(position, CursorPosition::BlockEnd(_)) {
            return Err(IrError::BuilderError(format!(
                "Block {} is already terminated",
                block_id
            )));
        }

        let next = match position {
            CursorPosition::BlockStart(_) => {
                block.instructions.insert(0, inst);
                CursorPosition::After(block_id, 0)
            }
            CursorPosition::BlockEnd(_) => {
                block.instructions.push(inst);
                CursorPosition::BlockEnd(block_id)
            }
            CursorPosition::After(_, index) => {
                let at = (index + 1).min(block.instructions.len());
                block.instructions.insert(at, inst);
                CursorPosition::After(block_id, at)
            }
            CursorPosition::Before(_, index) => {
                let at = index.min(block.instructions.len());
                block.instructions.insert(at, inst);
                CursorPosition::After(block_id, at)
            }
            CursorPosition::None => {
                return Err(IrError::BuilderError("Cursor not positioned".to_string()));
            }
        };

        self.position = next;
        Ok(())
    }
}
