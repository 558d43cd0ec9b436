use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::parameter::{Annotation, DefaultValue, Parameter};

/// A comparable piece of parameter metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    Kind,
    Default,
    Annotation,
}

impl Attribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::Default => "default",
            Self::Annotation => "annotation",
        }
    }

    /// Read this attribute from a parameter.
    pub fn value_of(self, param: &Parameter) -> AttributeValue {
        match self {
            Self::Kind => AttributeValue::Kind(param.kind),
            Self::Default => AttributeValue::Default(param.default.clone()),
            Self::Annotation => AttributeValue::Annotation(param.annotation.clone()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of one [`Attribute`] of a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeValue {
    Kind(Kind),
    Default(DefaultValue),
    Annotation(Annotation),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(k) => write!(f, "{k}"),
            Self::Default(d) => write!(f, "{d}"),
            Self::Annotation(a) => write!(f, "{a}"),
        }
    }
}

/// Attributes on which two parameters disagree, in `kind, default, annotation` order.
///
/// Default values are skipped when `compare_defaults` is `false`.
pub fn differing_attributes(
    left: &Parameter,
    right: &Parameter,
    compare_defaults: bool,
) -> Vec<Attribute> {
    let mut differing = Vec::new();
    if left.kind != right.kind {
        differing.push(Attribute::Kind);
    }
    if compare_defaults && left.default != right.default {
        differing.push(Attribute::Default);
    }
    if left.annotation != right.annotation {
        differing.push(Attribute::Annotation);
    }
    differing
}
