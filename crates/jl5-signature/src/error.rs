use jl5_types::TypeError;
use thiserror::Error;

pub type Result<T, E = SignatureError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Truncated input or an unexpected token.
    #[error("malformed signature `{signature}` at offset {offset}: {reason}")]
    Malformed {
        signature: String,
        offset: usize,
        reason: &'static str,
    },

    /// The signature parsed but declares invalid type parameters.
    #[error(transparent)]
    Type(#[from] TypeError),
}
