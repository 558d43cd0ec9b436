//! Error types for the merge crate.

use signia_types::SignatureError;

use crate::conflict::Conflict;

/// Errors that can occur while merging signatures.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MergeError {
    /// No signature sources were supplied.
    #[error("merge requires at least one signature")]
    NoSources,

    /// Two same-named parameters disagree and nothing was configured to
    /// reconcile them.
    #[error("conflicting parameter '{parameter}': {}", join_conflicts(.conflicts))]
    Conflict {
        parameter: String,
        conflicts: Vec<Conflict>,
    },

    /// A custom resolver returned a parameter that does not fit the slot.
    #[error("resolver returned an invalid parameter for '{parameter}': {reason}")]
    InvalidResolverResult { parameter: String, reason: String },

    /// The merged parameter list violates a signature invariant.
    #[error("merged signature is invalid: {0}")]
    Invariant(#[from] SignatureError),

    /// A policy name did not match any known policy.
    #[error("unknown policy {0:?}")]
    UnknownPolicy(String),

    /// Merge configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MergeError {
    /// The conflicts carried by a [`MergeError::Conflict`], empty otherwise.
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::Conflict { conflicts, .. } => conflicts,
            _ => &[],
        }
    }
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
