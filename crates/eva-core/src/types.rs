use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    I1,
    I8,
    I32,
    Ptr(Box<Type>),
    Void,
}

impl Type {
    pub fn ptr_to(pointee: Type) -> Self {
        Type::Ptr(Box::new(pointee))
    }

    /// `i8*`, the type of string constants and of `printf`'s format argument.
    pub fn byte_ptr() -> Self {
        Type::ptr_to(Type::I8)
    }

    pub fn bits(&self) -> u32 {
        match self {
            Type::I1 => 1,
            Type::I8 => 8,
            Type::I32 => 32,
            Type::Ptr(_) => 64,
            Type::Void => 0,
        }
    }

    pub fn size_bytes(&self) -> usize {
        match self {
            Type::I1 | Type::I8 => 1,
            Type::I32 => 4,
            Type::Ptr(_) => 8,
            Type::Void => 0,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I1 | Type::I8 | Type::I32)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Ptr(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I1 => write!(f, "i1"),
            Type::I8 => write!(f, "i8"),
            Type::I32 => write!(f, "i32"),
            Type::Ptr(inner) => write!(f, "{}*", inner),
            Type::Void => write!(f, "void"),
        }
    }
}
