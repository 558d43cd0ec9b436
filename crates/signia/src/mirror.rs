//! Metadata propagation from one callable to another.

use signia_combine::{Callable, Descriptor, Function};
use tracing::debug;

/// A captured copy of a callable's metadata, ready to be applied to a
/// wrapper.
#[derive(Clone, Debug, PartialEq)]
pub struct Mirror {
    source: Descriptor,
}

/// Capture the name, doc, and signature of `source`.
pub fn mirror_signature(source: &dyn Callable) -> Mirror {
    Mirror {
        source: source.descriptor().clone(),
    }
}

impl Mirror {
    /// The captured metadata.
    pub fn source(&self) -> &Descriptor {
        &self.source
    }

    /// Copy the captured metadata onto `target`.
    ///
    /// The target's body is untouched, but it now binds calls against the
    /// mirrored signature and reports the source as `wrapped`.
    pub fn apply(&self, mut target: Function) -> Function {
        debug!(
            source = %self.source.name,
            target = %target.name(),
            "mirroring signature"
        );
        target.descriptor_mut().mirror_from(&self.source);
        target
    }
}
