use thiserror::Error;

pub type Result<T, E = ResolutionError> = std::result::Result<T, E>;

/// Failure to select a single procedure for a call site.
///
/// Types are carried pre-formatted so the error can be reported without the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("reference to {name} in {container} is ambiguous: {}", candidates.join(" and "))]
    AmbiguousCall {
        name: String,
        container: String,
        args: Vec<String>,
        candidates: Vec<String>,
    },

    #[error("no applicable {name} found in {container} for arguments ({})", args.join(", "))]
    NoApplicableProcedure {
        name: String,
        container: String,
        args: Vec<String>,
    },

    #[error("type argument {arg} for {param} is not within its bound {bound}")]
    InvalidTypeArgument {
        param: String,
        arg: String,
        bound: String,
    },
}

/// Errors in declarations: bound lists and explicit type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("illegal forward reference to {referenced} in the bound of {param}")]
    IllegalForwardReference { param: String, referenced: String },

    #[error("invalid intersection {first} & {second}: {reason}")]
    InvalidIntersection {
        first: String,
        second: String,
        reason: String,
    },

    #[error("type argument {arg} for {param} is not within its bound {bound}")]
    InvalidTypeArgument {
        param: String,
        arg: String,
        bound: String,
    },

    #[error("wrong number of type arguments for {class}: expected {expected}, found {found}")]
    WrongTypeArgumentCount {
        class: String,
        expected: usize,
        found: usize,
    },
}
