//! Signature comparison for Signia.
//!
//! Answers whether two signatures are the same, strictly or structurally, and
//! explains the differences parameter by parameter.
//!
//! # Key Types
//!
//! - [`same_signature`] / [`CompareOptions`] -- Strict or structural equality
//! - [`SignatureDiff`] / [`ParameterChange`] -- Parameter-level diff

pub mod compare;
pub mod signature_diff;

pub use compare::{same_signature, CompareOptions};
pub use signature_diff::{diff_signatures, ParameterChange, SignatureDiff};
