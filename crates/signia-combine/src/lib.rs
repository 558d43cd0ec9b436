//! Call combinator for Signia.
//!
//! A [`Combined`] callable fronts a primary callable and any number of
//! secondaries under one merged signature. Each call is bound once against
//! the merged signature, then every callable receives only the arguments its
//! own signature names.
//!
//! A [`Fused`] callable publishes the same kind of merged signature, but hands
//! its body one memoizing [`SourceProxy`] per source instead of calling them.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use signia_combine::{combine, Arguments, Callable, CombineOptions, Function};
//!
//! let query = Function::new("query", "(sql: str, *, limit: int = 10)".parse().unwrap(), |args| {
//!     Ok(json!(format!("{} limit {}", args.value::<String>("sql")?, args.value::<i64>("limit")?)))
//! });
//! let audit = Function::new("audit", "(*, tag: str = \"none\")".parse().unwrap(), |_| {
//!     Ok(json!(null))
//! });
//!
//! let combined = combine(Arc::new(query), vec![Arc::new(audit)], &CombineOptions::default()).unwrap();
//! let out = combined.call(Arguments::new().arg("select 1").kwarg("tag", "t1")).unwrap();
//! assert_eq!(out, json!("select 1 limit 10"));
//! ```

pub mod arguments;
pub mod callable;
pub mod combine;
pub mod error;
pub mod fuse;

pub use arguments::{bind, Arguments, BoundArguments};
pub use callable::{Callable, Descriptor, Function};
pub use combine::{combine, CombineOptions, Combined};
pub use error::{BindingError, Collision, CombineError, CombineResult};
pub use fuse::{
    fuse, merge_fused_signatures, CallVars, FuseConflict, FuseOptions, Fused, FusedCall, SourceProxy,
};
