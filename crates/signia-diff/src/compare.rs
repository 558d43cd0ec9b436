//! Equality predicates over signatures.
//!
//! Two modes are supported. Strict comparison requires element-wise identity
//! of the parameter lists. Structural comparison ignores parameter order and
//! default values, and only asks whether the same names exist with the same
//! kinds (and annotations, unless ignored).

use serde::{Deserialize, Serialize};
use signia_types::{Signature, SignatureSource};

/// Options controlling [`same_signature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Element-wise comparison including defaults and return annotation.
    pub strict: bool,
    /// Ignore parameter and return annotations.
    pub ignore_annotations: bool,
    /// Ignore the return annotation only (strict mode).
    pub ignore_return: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            strict: true,
            ignore_annotations: false,
            ignore_return: false,
        }
    }
}

impl CompareOptions {
    /// Strict comparison (the default).
    pub fn strict() -> Self {
        Self::default()
    }

    /// Order-independent comparison tolerant of default-value differences.
    pub fn structural() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn ignoring_annotations(mut self) -> Self {
        self.ignore_annotations = true;
        self
    }

    pub fn ignoring_return(mut self) -> Self {
        self.ignore_return = true;
        self
    }
}

/// Compare the signatures of two signature sources.
///
/// Never fails: any structural mismatch yields `false`.
///
/// # Examples
///
/// ```
/// use signia_diff::{same_signature, CompareOptions};
/// use signia_types::Signature;
///
/// let a: Signature = "(x: int, y: int = 0) -> int".parse().unwrap();
/// let b: Signature = "(x: int, y: int = 1) -> int".parse().unwrap();
/// assert!(!same_signature(&a, &b, &CompareOptions::strict()));
/// assert!(same_signature(&a, &b, &CompareOptions::structural()));
/// ```
pub fn same_signature(
    a: &dyn SignatureSource,
    b: &dyn SignatureSource,
    options: &CompareOptions,
) -> bool {
    let (a, b) = (a.signature(), b.signature());
    if options.strict {
        strict_equal(a, b, options)
    } else {
        structurally_equal(a, b, options.ignore_annotations)
    }
}

fn strict_equal(a: &Signature, b: &Signature, options: &CompareOptions) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let parameters_match = a.iter().zip(b.iter()).all(|(left, right)| {
        left.name == right.name
            && left.kind == right.kind
            && left.default == right.default
            && (options.ignore_annotations || left.annotation == right.annotation)
    });
    if !parameters_match {
        return false;
    }
    options.ignore_annotations
        || options.ignore_return
        || a.return_annotation() == b.return_annotation()
}

fn structurally_equal(a: &Signature, b: &Signature, ignore_annotations: bool) -> bool {
    // Names are unique within a signature, so equal length plus a match for
    // every name on one side is multiset equality of (name, kind).
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|left| match b.get(&left.name) {
        Some(right) => {
            left.kind == right.kind && (ignore_annotations || left.annotation == right.annotation)
        }
        None => false,
    })
}
