use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use signia_types::Parameter;

use crate::error::MergeError;

/// Tie-break for same-named parameters that do not conflict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Keep the parameter that was placed first.
    #[default]
    PreferFirst,
    /// Replace with the most recent occurrence.
    PreferLast,
}

impl Policy {
    /// Returns `true` if the incoming parameter replaces the slot.
    pub fn prefers_incoming(self) -> bool {
        matches!(self, Self::PreferLast)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreferFirst => "prefer-first",
            Self::PreferLast => "prefer-last",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-first" => Ok(Self::PreferFirst),
            "prefer-last" => Ok(Self::PreferLast),
            other => Err(MergeError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Named strategy for same-named parameters that do conflict.
///
/// Every named strategy adopts one of the two parameters wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    PreferFirst,
    PreferLast,
    /// Keep whichever parameter declares a default.
    PreferDefaulted,
    /// Keep whichever parameter declares an annotation.
    PreferAnnotated,
}

impl ConflictPolicy {
    /// Decide whether `incoming` replaces `existing`.
    ///
    /// `PreferDefaulted` and `PreferAnnotated` defer to `fallback` when both
    /// or neither parameter qualifies.
    pub fn prefers_incoming(self, existing: &Parameter, incoming: &Parameter, fallback: Policy) -> bool {
        let pick = |existing_has: bool, incoming_has: bool| match (existing_has, incoming_has) {
            (true, false) => false,
            (false, true) => true,
            _ => fallback.prefers_incoming(),
        };
        match self {
            Self::PreferFirst => false,
            Self::PreferLast => true,
            Self::PreferDefaulted => pick(existing.has_default(), incoming.has_default()),
            Self::PreferAnnotated => pick(existing.has_annotation(), incoming.has_annotation()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreferFirst => "prefer-first",
            Self::PreferLast => "prefer-last",
            Self::PreferDefaulted => "prefer-defaulted",
            Self::PreferAnnotated => "prefer-annotated",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-first" => Ok(Self::PreferFirst),
            "prefer-last" => Ok(Self::PreferLast),
            "prefer-defaulted" => Ok(Self::PreferDefaulted),
            "prefer-annotated" => Ok(Self::PreferAnnotated),
            other => Err(MergeError::UnknownPolicy(other.to_string())),
        }
    }
}

impl From<Policy> for ConflictPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::PreferFirst => Self::PreferFirst,
            Policy::PreferLast => Self::PreferLast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        for name in ["prefer-first", "prefer-last", "prefer-defaulted", "prefer-annotated"] {
            let policy: ConflictPolicy = name.parse().unwrap();
            assert_eq!(policy.to_string(), name);
        }
        assert_eq!("prefer-last".parse::<Policy>().unwrap(), Policy::PreferLast);
    }

    #[test]
    fn unknown_names_rejected() {
        assert_eq!(
            "prefer-defaulted".parse::<Policy>().unwrap_err(),
            MergeError::UnknownPolicy("prefer-defaulted".into())
        );
        assert!("invalid".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn prefer_defaulted_picks_the_defaulted_side() {
        let bare = Parameter::keyword_only("x");
        let defaulted = Parameter::keyword_only("x").with_default(1);
        let policy = ConflictPolicy::PreferDefaulted;
        assert!(policy.prefers_incoming(&bare, &defaulted, Policy::PreferFirst));
        assert!(!policy.prefers_incoming(&defaulted, &bare, Policy::PreferLast));
    }

    #[test]
    fn prefer_defaulted_falls_back_when_tied() {
        let one = Parameter::keyword_only("x").with_default(1);
        let two = Parameter::keyword_only("x").with_default(2);
        let policy = ConflictPolicy::PreferDefaulted;
        assert!(!policy.prefers_incoming(&one, &two, Policy::PreferFirst));
        assert!(policy.prefers_incoming(&one, &two, Policy::PreferLast));
    }

    #[test]
    fn prefer_annotated_picks_the_annotated_side() {
        let bare = Parameter::keyword_only("b");
        let annotated = Parameter::keyword_only("b").with_annotation("int");
        let policy = ConflictPolicy::PreferAnnotated;
        assert!(policy.prefers_incoming(&bare, &annotated, Policy::PreferFirst));
        assert!(!policy.prefers_incoming(&annotated, &bare, Policy::PreferLast));
    }
}
