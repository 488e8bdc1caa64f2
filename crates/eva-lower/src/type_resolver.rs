use crate::errors::{LowerError, LowerResult};
use eva_core::Type;

/// Maps surface type names from declarations like `(var (s string) ...)` to IR types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeResolver {
    strict: bool,
}

impl TypeResolver {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Unknown names fall back to `i32` unless the resolver is strict.
    pub fn resolve(&self, name: &str) -> LowerResult<Type> {
        match name {
            "number" => Ok(Type::I32),
            "string" => Ok(Type::byte_ptr()),
            _ if self.strict => Err(LowerError::UnknownType(name.to_string())),
            _ => {
                tracing::debug!(type_name = name, "unknown type name, defaulting to i32");
                Ok(Type::I32)
            }
        }
    }

    /// Type of an undeclared-type binding such as `(var x 1)`.
    pub fn default_type(&self) -> Type {
        Type::I32
    }
}
