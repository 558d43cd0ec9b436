use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use signia_merge::{merge_with_owners, MergeOptions};
use signia_types::{Signature, SignatureSource};
use tracing::debug;

use crate::arguments::{bind, Arguments};
use crate::callable::{Callable, Descriptor};
use crate::error::{CombineError, CombineResult};

// ---------------------------------------------------------------------------
// CombineOptions
// ---------------------------------------------------------------------------

/// Options for [`combine`].
#[derive(Clone, Debug, Default)]
pub struct CombineOptions {
    /// How the primary and secondary signatures are merged.
    pub merge: MergeOptions,
    /// Name of the combined callable; defaults to the primary's.
    pub name: Option<String>,
    /// Doc of the combined callable; defaults to the primary's.
    pub doc: Option<String>,
}

impl CombineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Combined
// ---------------------------------------------------------------------------

/// A primary callable fronting any number of secondaries under one merged
/// signature.
///
/// Each call binds against the merged signature, runs the primary with its
/// share of the arguments, then each secondary in declaration order with
/// theirs. Secondary results are discarded and the primary's is returned.
pub struct Combined {
    descriptor: Descriptor,
    primary: Arc<dyn Callable>,
    secondary: Vec<Arc<dyn Callable>>,
    owners: BTreeMap<String, usize>,
}

impl Combined {
    pub fn primary(&self) -> &Arc<dyn Callable> {
        &self.primary
    }

    pub fn secondary(&self) -> &[Arc<dyn Callable>] {
        &self.secondary
    }

    /// The callable whose parameter occupies the named slot of the merged
    /// signature.
    pub fn owner_of(&self, parameter: &str) -> Option<&Arc<dyn Callable>> {
        match *self.owners.get(parameter)? {
            0 => Some(&self.primary),
            i => self.secondary.get(i - 1),
        }
    }
}

impl SignatureSource for Combined {
    fn signature(&self) -> &Signature {
        &self.descriptor.signature
    }
}

impl Callable for Combined {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn call(&self, args: Arguments) -> CombineResult<Value> {
        let mut bound = bind(&self.descriptor.signature, args)
            .map_err(|e| CombineError::binding(&self.descriptor.name, e))?;
        bound.apply_defaults();

        // Every share is projected before anything runs, so a binding failure
        // for a late secondary leaves no partial side effects.
        let primary_args = bound
            .project(self.primary.signature())
            .map_err(|e| CombineError::binding(self.primary.name(), e))?;
        let secondary_args = self
            .secondary
            .iter()
            .map(|callable| {
                bound
                    .project(callable.signature())
                    .map_err(|e| CombineError::binding(callable.name(), e))
            })
            .collect::<CombineResult<Vec<_>>>()?;

        debug!(callable = %self.primary.name(), role = "primary", "routing call");
        let result = self.primary.call(primary_args)?;

        for (callable, args) in self.secondary.iter().zip(secondary_args) {
            debug!(callable = %callable.name(), role = "secondary", "routing call");
            callable.call(args)?;
        }

        Ok(result)
    }
}

impl std::fmt::Debug for Combined {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combined")
            .field("descriptor", &self.descriptor)
            .field("primary", &self.primary.name())
            .field(
                "secondary",
                &self.secondary.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// combine
// ---------------------------------------------------------------------------

/// Build a [`Combined`] callable over `primary` and `secondary`.
///
/// The merged signature is computed once, over `(primary, *secondary)` in
/// that order, so merge errors surface here rather than at call time.
pub fn combine(
    primary: Arc<dyn Callable>,
    secondary: Vec<Arc<dyn Callable>>,
    options: &CombineOptions,
) -> CombineResult<Combined> {
    let mut sources: Vec<&dyn SignatureSource> = Vec::with_capacity(secondary.len() + 1);
    sources.push(&primary);
    sources.extend(secondary.iter().map(|c| c as &dyn SignatureSource));

    let outcome = merge_with_owners(&sources, &options.merge)?;
    debug!(
        primary = %primary.name(),
        secondaries = secondary.len(),
        parameters = outcome.signature.len(),
        "combined signature built"
    );

    let mut descriptor = Descriptor::new(
        options
            .name
            .clone()
            .unwrap_or_else(|| primary.name().to_string()),
        outcome.signature,
    );
    descriptor.doc = options
        .doc
        .clone()
        .or_else(|| primary.descriptor().doc.clone());

    Ok(Combined {
        descriptor,
        primary,
        secondary,
        owners: outcome.owners,
    })
}
