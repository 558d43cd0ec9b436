use thiserror::Error;

use crate::kind::Kind;

/// Errors produced when constructing or parsing a [`Signature`](crate::Signature).
///
/// Every variant describes a violated signature invariant; none of them is
/// recoverable by retrying the same input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("duplicate parameter name '{0}'")]
    DuplicateParameter(String),

    #[error("parameter '{name}' of kind {kind} cannot follow parameter '{previous}' of kind {previous_kind}")]
    KindOrder {
        name: String,
        kind: Kind,
        previous: String,
        previous_kind: Kind,
    },

    #[error("more than one {kind} parameter: '{first}' and '{second}'")]
    MultipleVariadic {
        kind: Kind,
        first: String,
        second: String,
    },

    #[error("invalid parameter name {0:?}")]
    InvalidName(String),

    #[error("{kind} parameter '{name}' cannot have a default value")]
    VariadicDefault { name: String, kind: Kind },

    #[error("cannot parse signature {input:?}: {reason}")]
    Parse { input: String, reason: String },
}

/// Convenience alias for signature construction results.
pub type SignatureResult<T> = Result<T, SignatureError>;
