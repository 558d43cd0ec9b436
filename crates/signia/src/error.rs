use thiserror::Error;

/// Any error raised by the Signia crates.
#[derive(Debug, Error)]
pub enum SigniaError {
    #[error("signature error: {0}")]
    Signature(#[from] signia_types::SignatureError),

    #[error("merge error: {0}")]
    Merge(#[from] signia_merge::MergeError),

    #[error(transparent)]
    Combine(#[from] signia_combine::CombineError),

    #[error(transparent)]
    Binding(#[from] signia_combine::BindingError),
}

pub type SigniaResult<T> = Result<T, SigniaError>;
