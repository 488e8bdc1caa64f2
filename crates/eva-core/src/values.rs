use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Result of an instruction or phi, numbered per function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ss{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gv{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StrId(pub u32);

impl std::fmt::Display for StrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "str{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Bool(bool),
    Int(i32),
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Bool(_) => Type::I1,
            Constant::Int(_) => Type::I32,
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            Constant::Bool(b) => *b as i32,
            Constant::Int(v) => *v,
        }
    }
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Constant(Constant),
    Temp(ValueId),
    /// Address of a stack slot in the entry block.
    Slot(SlotId),
    /// Address of a module-level variable.
    Global(GlobalId),
    /// Address of a module-level read-only string.
    Str(StrId),
    Function(String),
}

impl Value {
    pub fn int(value: i32) -> Self {
        Value::Constant(Constant::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Value::Constant(Constant::Bool(value))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_temp(&self) -> Option<ValueId> {
        match self {
            Value::Temp(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, Value::Slot(_) | Value::Global(_) | Value::Str(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Constant(c) => write!(f, "{}", c),
            Value::Temp(id) => write!(f, "{}", id),
            Value::Slot(id) => write!(f, "{}", id),
            Value::Global(id) => write!(f, "{}", id),
            Value::Str(id) => write!(f, "{}", id),
            Value::Function(name) => write!(f, "%{}", name),
        }
    }
}
