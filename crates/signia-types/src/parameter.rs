use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::Kind;

/// The default value of a parameter.
///
/// `Empty` is the "no default" marker. It is distinct from
/// `DefaultValue::Value(Value::Null)`, which is a real default of `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultValue {
    #[default]
    Empty,
    Value(Value),
}

impl DefaultValue {
    /// Returns `true` if no default is declared.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The default value, if one is declared.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Empty => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// The type annotation of a parameter or return value.
///
/// Annotations are opaque type expressions (`"int"`, `"list[str]"`) compared
/// by exact text. `Empty` is the "no annotation" marker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Annotation {
    #[default]
    Empty,
    Type(String),
}

impl Annotation {
    /// Create a type annotation.
    pub fn new(expr: impl Into<String>) -> Self {
        Self::Type(expr.into())
    }

    /// Returns `true` if no annotation is declared.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The annotation text, if one is declared.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Type(t) => Some(t),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Type(t) => f.write_str(t),
        }
    }
}

impl From<&str> for Annotation {
    fn from(expr: &str) -> Self {
        Self::Type(expr.to_string())
    }
}

impl From<String> for Annotation {
    fn from(expr: String) -> Self {
        Self::Type(expr)
    }
}

/// One named slot of a [`Signature`](crate::Signature).
///
/// Parameters are plain values. The `with_*` methods return modified copies,
/// leaving the original untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name; the identity of the parameter within a signature.
    pub name: String,
    /// Calling-convention category.
    pub kind: Kind,
    /// Declared default, or [`DefaultValue::Empty`].
    #[serde(default)]
    pub default: DefaultValue,
    /// Declared annotation, or [`Annotation::Empty`].
    #[serde(default)]
    pub annotation: Annotation,
}

impl Parameter {
    /// Create a parameter with no default and no annotation.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: DefaultValue::Empty,
            annotation: Annotation::Empty,
        }
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, Kind::PositionalOnly)
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, Kind::PositionalOrKeyword)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::new(name, Kind::VarPositional)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::new(name, Kind::KeywordOnly)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::new(name, Kind::VarKeyword)
    }

    /// Copy with the given default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }

    /// Copy with the default removed.
    pub fn without_default(mut self) -> Self {
        self.default = DefaultValue::Empty;
        self
    }

    /// Copy with the given annotation.
    pub fn with_annotation(mut self, annotation: impl Into<Annotation>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Copy with the annotation removed.
    pub fn without_annotation(mut self) -> Self {
        self.annotation = Annotation::Empty;
        self
    }

    /// Copy with a different kind.
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns `true` if a default is declared.
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }

    /// Returns `true` if an annotation is declared.
    pub fn has_annotation(&self) -> bool {
        !self.annotation.is_empty()
    }

    /// Returns `true` if a call must supply a value for this parameter.
    pub fn is_required(&self) -> bool {
        !self.kind.is_variadic() && self.default.is_empty()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::VarPositional => f.write_str("*")?,
            Kind::VarKeyword => f.write_str("**")?,
            _ => {}
        }
        f.write_str(&self.name)?;
        if let Annotation::Type(t) = &self.annotation {
            write!(f, ": {t}")?;
        }
        if let DefaultValue::Value(v) = &self.default {
            if self.annotation.is_empty() {
                write!(f, "={v}")?;
            } else {
                write!(f, " = {v}")?;
            }
        }
        Ok(())
    }
}
