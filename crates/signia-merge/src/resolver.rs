use std::fmt;
use std::sync::Arc;

use signia_types::Parameter;

use crate::conflict::Conflict;
use crate::error::MergeResult;
use crate::policy::ConflictPolicy;

/// A caller-supplied strategy that reconciles a conflict into one parameter.
///
/// The merger checks the returned parameter: its name must equal `name` and
/// its kind must equal `existing.kind`. Anything else is rejected with
/// [`MergeError::InvalidResolverResult`](crate::MergeError::InvalidResolverResult).
///
/// Closures with the matching shape implement this trait.
pub trait ConflictResolver: Send + Sync {
    fn resolve(
        &self,
        name: &str,
        existing: &Parameter,
        incoming: &Parameter,
        conflicts: &[Conflict],
    ) -> MergeResult<Parameter>;
}

impl<F> ConflictResolver for F
where
    F: Fn(&str, &Parameter, &Parameter, &[Conflict]) -> MergeResult<Parameter> + Send + Sync,
{
    fn resolve(
        &self,
        name: &str,
        existing: &Parameter,
        incoming: &Parameter,
        conflicts: &[Conflict],
    ) -> MergeResult<Parameter> {
        self(name, existing, incoming, conflicts)
    }
}

/// What to do when same-named parameters conflict.
#[derive(Clone)]
pub enum OnConflict {
    /// Adopt one side wholesale according to a named policy.
    Policy(ConflictPolicy),
    /// Delegate to a custom resolver.
    Resolver(Arc<dyn ConflictResolver>),
}

impl OnConflict {
    /// Wrap a resolver closure.
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&str, &Parameter, &Parameter, &[Conflict]) -> MergeResult<Parameter>
            + Send
            + Sync
            + 'static,
    {
        Self::Resolver(Arc::new(f))
    }
}

impl From<ConflictPolicy> for OnConflict {
    fn from(policy: ConflictPolicy) -> Self {
        Self::Policy(policy)
    }
}

impl fmt::Debug for OnConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(policy) => f.debug_tuple("Policy").field(policy).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}
