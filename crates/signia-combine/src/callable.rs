use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use signia_types::{Signature, SignatureSource};

use crate::arguments::{bind, Arguments, BoundArguments};
use crate::error::{CombineError, CombineResult};

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Metadata record of a callable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    pub signature: Signature,
    /// Name of the callable this one's metadata was mirrored from.
    #[serde(default)]
    pub wrapped: Option<String>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            doc: None,
            signature,
            wrapped: None,
        }
    }

    /// Copy name, doc, and signature from `source`, recording it as wrapped.
    pub fn mirror_from(&mut self, source: &Descriptor) {
        self.name = source.name.clone();
        self.doc = source.doc.clone();
        self.signature = source.signature.clone();
        self.wrapped = Some(source.name.clone());
    }
}

// ---------------------------------------------------------------------------
// Callable
// ---------------------------------------------------------------------------

/// Something that can be invoked with [`Arguments`] and describes its own
/// signature.
pub trait Callable: SignatureSource + Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Invoke with the given arguments.
    fn call(&self, args: Arguments) -> CombineResult<Value>;
}

// ---------------------------------------------------------------------------
// Function
// ---------------------------------------------------------------------------

type Body = dyn Fn(&BoundArguments<'_>) -> CombineResult<Value> + Send + Sync;

/// A named closure with a declared signature.
///
/// Calls are bound against the declared signature, defaults are applied, and
/// the closure receives the resulting [`BoundArguments`].
#[derive(Clone)]
pub struct Function {
    descriptor: Descriptor,
    body: Arc<Body>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&BoundArguments<'_>) -> CombineResult<Value> + Send + Sync + 'static,
    {
        Self {
            descriptor: Descriptor::new(name, signature),
            body: Arc::new(body),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.descriptor.doc = Some(doc.into());
        self
    }

    pub fn descriptor_mut(&mut self) -> &mut Descriptor {
        &mut self.descriptor
    }
}

impl SignatureSource for Function {
    fn signature(&self) -> &Signature {
        &self.descriptor.signature
    }
}

impl Callable for Function {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn call(&self, args: Arguments) -> CombineResult<Value> {
        let mut bound = bind(&self.descriptor.signature, args)
            .map_err(|e| CombineError::binding(&self.descriptor.name, e))?;
        bound.apply_defaults();
        (self.body)(&bound)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
