use crate::block::BlockId;
use crate::types::Type;
use crate::values::{SlotId, Value, ValueId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
}

impl BinaryOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            BinaryOp::Add => "iadd",
            BinaryOp::Sub => "isub",
            BinaryOp::Mul => "imul",
            BinaryOp::SDiv => "sdiv",
        }
    }
}

/// Integer comparison condition codes. Ordered comparisons are unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntCC {
    Equal,
    NotEqual,
    UnsignedGreaterThan,
    UnsignedGreaterThanOrEqual,
    UnsignedLessThan,
    UnsignedLessThanOrEqual,
}

impl IntCC {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            IntCC::Equal => "eq",
            IntCC::NotEqual => "ne",
            IntCC::UnsignedGreaterThan => "ugt",
            IntCC::UnsignedGreaterThanOrEqual => "uge",
            IntCC::UnsignedLessThan => "ult",
            IntCC::UnsignedLessThanOrEqual => "ule",
        }
    }

    pub fn evaluate(&self, left: u32, right: u32) -> bool {
        match self {
            IntCC::Equal => left == right,
            IntCC::NotEqual => left != right,
            IntCC::UnsignedGreaterThan => left > right,
            IntCC::UnsignedGreaterThanOrEqual => left >= right,
            IntCC::UnsignedLessThan => left < right,
            IntCC::UnsignedLessThanOrEqual => left <= right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Alloca {
        slot: SlotId,
        ty: Type,
        name: String,
    },
    Load {
        result: ValueId,
        ty: Type,
        address: Value,
    },
    Store {
        address: Value,
        value: Value,
    },
    Binary {
        result: ValueId,
        op: BinaryOp,
        left: Value,
        right: Value,
    },
    Icmp {
        result: ValueId,
        cond: IntCC,
        left: Value,
        right: Value,
    },
    Call {
        result: ValueId,
        callee: String,
        args: Vec<Value>,
    },
    Phi {
        result: ValueId,
        ty: Type,
        incoming: Vec<(Value, BlockId)>,
    },
}

impl Instruction {
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Instruction::Load { result, .. }
            | Instruction::Binary { result, .. }
            | Instruction::Icmp { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Phi { result, .. } => Some(*result),
            Instruction::Alloca { .. } | Instruction::Store { .. } => None,
        }
    }

    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { address, .. } => vec![address],
            Instruction::Store { address, value } => vec![address, value],
            Instruction::Binary { left, right, .. } | Instruction::Icmp { left, right, .. } => {
                vec![left, right]
            }
            Instruction::Call { args, .. } => args.iter().collect(),
            Instruction::Phi { incoming, .. } => incoming.iter().map(|(v, _)| v).collect(),
        }
    }

    pub fn is_alloca(&self) -> bool {
        matches!(self, Instruction::Alloca { .. })
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Phi { .. })
    }
}
