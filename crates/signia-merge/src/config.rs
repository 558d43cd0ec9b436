use serde::{Deserialize, Serialize};
use signia_types::Parameter;

use crate::conflict::Conflict;
use crate::error::{MergeError, MergeResult};
use crate::policy::{ConflictPolicy, Policy};
use crate::resolver::OnConflict;

/// Options controlling a merge.
#[derive(Clone, Debug)]
pub struct MergeOptions {
    /// Tie-break for same-named parameters that do not conflict.
    pub policy: Policy,
    /// Strategy for same-named parameters that do conflict. `None` turns every
    /// conflict into [`MergeError::Conflict`].
    pub on_conflict: Option<OnConflict>,
    /// Whether differing default values count as conflicts.
    pub compare_defaults: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            policy: Policy::PreferFirst,
            on_conflict: None,
            compare_defaults: true,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve conflicts with a named policy.
    pub fn with_on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = Some(OnConflict::Policy(policy));
        self
    }

    /// Resolve conflicts with a custom resolver.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str, &Parameter, &Parameter, &[Conflict]) -> MergeResult<Parameter>
            + Send
            + Sync
            + 'static,
    {
        self.on_conflict = Some(OnConflict::resolver(resolver));
        self
    }

    pub fn compare_defaults(mut self, compare: bool) -> Self {
        self.compare_defaults = compare;
        self
    }
}

/// Serializable merge configuration.
///
/// Covers everything in [`MergeOptions`] except custom resolvers, which can
/// only be attached in code.
///
/// ```toml
/// policy = "prefer-last"
/// on_conflict = "prefer-defaulted"
/// compare_defaults = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub policy: Policy,
    pub on_conflict: Option<ConflictPolicy>,
    pub compare_defaults: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            policy: Policy::PreferFirst,
            on_conflict: None,
            compare_defaults: true,
        }
    }
}

impl MergeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> MergeResult<Self> {
        toml::from_str(text).map_err(|e| MergeError::Config(e.to_string()))
    }

    /// Render the configuration as TOML text.
    pub fn to_toml_string(&self) -> MergeResult<String> {
        toml::to_string(self).map_err(|e| MergeError::Config(e.to_string()))
    }

    pub fn into_options(self) -> MergeOptions {
        MergeOptions {
            policy: self.policy,
            on_conflict: self.on_conflict.map(OnConflict::Policy),
            compare_defaults: self.compare_defaults,
        }
    }
}

impl From<MergeConfig> for MergeOptions {
    fn from(config: MergeConfig) -> Self {
        config.into_options()
    }
}
