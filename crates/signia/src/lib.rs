//! Signia: compare, merge, and combine callable signatures.
//!
//! This is the main entry point for applications. It re-exports the public
//! API of the component crates and adds metadata mirroring.
//!
//! - [`same_signature`] / [`diff_signatures`] compare signatures.
//! - [`merge_signatures`] folds several signatures into one.
//! - [`combine`] fronts a primary callable and its secondaries with the
//!   merged signature and routes each call's arguments.
//! - [`fuse`] publishes the merged signature of several sources and lets a
//!   body decide when each source runs.
//! - [`mirror_signature`] copies one callable's metadata onto a wrapper.

pub mod error;
pub mod mirror;

pub use error::{SigniaError, SigniaResult};
pub use mirror::{mirror_signature, Mirror};

pub use signia_types::{
    differing_attributes, Annotation, Attribute, AttributeValue, DefaultValue, Kind, Parameter,
    Signature, SignatureError, SignatureResult, SignatureSource, Value,
};
pub use signia_diff::{diff_signatures, same_signature, CompareOptions, ParameterChange, SignatureDiff};
pub use signia_merge::{
    merge_signatures, merge_with_owners, Conflict, ConflictPolicy, ConflictResolver, MergeConfig,
    MergeError, MergeOptions, MergeOutcome, MergeResult, OnConflict, Policy,
};
pub use signia_combine::{
    bind, combine, fuse, merge_fused_signatures, Arguments, BindingError, BoundArguments,
    CallVars, Callable, Collision, CombineError, CombineOptions, CombineResult, Combined,
    Descriptor, Function, FuseConflict, FuseOptions, Fused, FusedCall, SourceProxy,
};
