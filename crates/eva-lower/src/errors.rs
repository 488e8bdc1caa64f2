use eva_core::IrError;
use eva_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LowerError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("Unbound name: {0}")]
    UnboundName(String),

    #[error("Unknown form: {0}")]
    UnknownForm(String),

    #[error("`{form}` expects {expected} operand(s), found {found}")]
    Arity {
        form: String,
        expected: String,
        found: usize,
    },

    #[error("Invalid `{form}` target: {reason}")]
    InvalidTarget { form: String, reason: String },

    #[error("Cannot assign to `{0}`: it is not a variable")]
    NotAssignable(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Number literal {0} does not fit in 32 bits")]
    LiteralOutOfRange(i64),

    #[error("Extern function `{0}` is not declared")]
    MissingExtern(String),

    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

pub type LowerResult<T> = Result<T, LowerError>;

impl LowerError {
    pub(crate) fn arity(form: &str, expected: impl Into<String>, found: usize) -> Self {
        LowerError::Arity {
            form: form.to_string(),
            expected: expected.into(),
            found,
        }
    }

    pub(crate) fn invalid_target(form: &str, reason: impl Into<String>) -> Self {
        LowerError::InvalidTarget {
            form: form.to_string(),
            reason: reason.into(),
        }
    }
}
