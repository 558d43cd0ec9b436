//! Foundation types for Signia.
//!
//! This crate provides the parameter model shared by every other Signia crate:
//! parameter kinds and their total order, parameters with default and
//! annotation metadata, and validated signatures with a textual form.
//!
//! # Key Types
//!
//! - [`Kind`] — Parameter category with a fixed total order
//! - [`Parameter`] — Name, kind, default, and annotation of one slot
//! - [`DefaultValue`] / [`Annotation`] — Metadata with dedicated "empty" markers
//! - [`Signature`] — Ordered, kind-validated parameter list plus return annotation
//! - [`SignatureSource`] — Anything that exposes a signature
//! - [`Attribute`] — The metadata fields compared by diffing and merging

pub mod attribute;
pub mod error;
pub mod kind;
pub mod parameter;
mod parse;
pub mod signature;

pub use attribute::{differing_attributes, Attribute, AttributeValue};
pub use error::{SignatureError, SignatureResult};
pub use kind::Kind;
pub use parameter::{Annotation, DefaultValue, Parameter};
pub use signature::{is_identifier, Signature, SignatureSource};

pub use serde_json::Value;
