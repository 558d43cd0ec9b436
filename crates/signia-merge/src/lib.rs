//! Merge engine for Signia.
//!
//! Folds several signatures into one. Same-named parameters share a single
//! slot; disagreements between them are detected attribute by attribute and
//! either reconciled by a named policy or a custom resolver, or reported.
//!
//! # Quick Start
//!
//! ```rust
//! use signia_merge::{merge_signatures, ConflictPolicy, MergeOptions, Policy};
//! use signia_types::Signature;
//!
//! let first: Signature = "(*, c: int = 1, d: float)".parse().unwrap();
//! let second: Signature = "(*, c: int = 2)".parse().unwrap();
//!
//! // Differing defaults are a conflict unless something resolves them.
//! assert!(merge_signatures(&[&first, &second], &MergeOptions::default()).is_err());
//!
//! let options = MergeOptions::default()
//!     .with_policy(Policy::PreferLast)
//!     .with_on_conflict(ConflictPolicy::PreferDefaulted);
//! let merged = merge_signatures(&[&first, &second], &options).unwrap();
//! assert_eq!(merged.to_string(), "(*, c: int = 2, d: float)");
//! ```

pub mod config;
pub mod conflict;
pub mod error;
pub mod merge;
pub mod policy;
pub mod resolver;

pub use config::{MergeConfig, MergeOptions};
pub use conflict::Conflict;
pub use error::{MergeError, MergeResult};
pub use merge::{merge_signatures, merge_with_owners, MergeOutcome};
pub use policy::{ConflictPolicy, Policy};
pub use resolver::{ConflictResolver, OnConflict};
