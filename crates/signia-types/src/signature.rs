use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SignatureError, SignatureResult};
use crate::kind::Kind;
use crate::parameter::{Annotation, Parameter};

/// An ordered, kind-validated parameter list plus a return annotation.
///
/// A `Signature` can only be obtained through [`Signature::new`], parsing, or
/// deserialization, all of which enforce the same invariants:
///
/// - parameter names are valid identifiers and unique
/// - kinds never decrease along the list (see [`Kind`])
/// - at most one [`Kind::VarPositional`] and one [`Kind::VarKeyword`]
/// - variadic parameters carry no default
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignature")]
pub struct Signature {
    parameters: Vec<Parameter>,
    #[serde(default)]
    return_annotation: Annotation,
}

#[derive(Deserialize)]
struct RawSignature {
    parameters: Vec<Parameter>,
    #[serde(default)]
    return_annotation: Annotation,
}

impl TryFrom<RawSignature> for Signature {
    type Error = SignatureError;

    fn try_from(raw: RawSignature) -> Result<Self, Self::Error> {
        Self::new(raw.parameters, raw.return_annotation)
    }
}

impl Signature {
    /// Build a signature, validating every invariant.
    pub fn new(
        parameters: Vec<Parameter>,
        return_annotation: Annotation,
    ) -> SignatureResult<Self> {
        validate(&parameters)?;
        Ok(Self {
            parameters,
            return_annotation,
        })
    }

    /// A signature with no parameters and no return annotation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn return_annotation(&self) -> &Annotation {
        &self.return_annotation
    }

    /// Copy with a different return annotation.
    pub fn with_return_annotation(mut self, annotation: impl Into<Annotation>) -> Self {
        self.return_annotation = annotation.into();
        self
    }

    /// Copy with every parameter annotation and the return annotation removed.
    pub fn without_annotations(&self) -> Self {
        Self {
            parameters: self
                .parameters
                .iter()
                .cloned()
                .map(Parameter::without_annotation)
                .collect(),
            return_annotation: Annotation::Empty,
        }
    }

    /// Look up a parameter by exact name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Index of the named parameter.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Parameters of a single kind, in declaration order.
    pub fn of_kind(&self, kind: Kind) -> impl Iterator<Item = &Parameter> + '_ {
        self.parameters.iter().filter(move |p| p.kind == kind)
    }

    /// The `*args` parameter, if any.
    pub fn var_positional(&self) -> Option<&Parameter> {
        self.of_kind(Kind::VarPositional).next()
    }

    /// The `**kwargs` parameter, if any.
    pub fn var_keyword(&self) -> Option<&Parameter> {
        self.of_kind(Kind::VarKeyword).next()
    }

    /// Decompose into parameters and return annotation.
    pub fn into_parts(self) -> (Vec<Parameter>, Annotation) {
        (self.parameters, self.return_annotation)
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Returns `true` if `name` is a valid parameter identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn validate(parameters: &[Parameter]) -> SignatureResult<()> {
    let mut seen = HashSet::with_capacity(parameters.len());
    let mut var_positional: Option<&str> = None;
    let mut var_keyword: Option<&str> = None;
    let mut previous: Option<&Parameter> = None;

    for param in parameters {
        if !is_identifier(&param.name) {
            return Err(SignatureError::InvalidName(param.name.clone()));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(SignatureError::DuplicateParameter(param.name.clone()));
        }

        let slot = match param.kind {
            Kind::VarPositional => Some(&mut var_positional),
            Kind::VarKeyword => Some(&mut var_keyword),
            _ => None,
        };
        if let Some(slot) = slot {
            if let Some(first) = slot {
                return Err(SignatureError::MultipleVariadic {
                    kind: param.kind,
                    first: first.to_string(),
                    second: param.name.clone(),
                });
            }
            if param.has_default() {
                return Err(SignatureError::VariadicDefault {
                    name: param.name.clone(),
                    kind: param.kind,
                });
            }
            *slot = Some(param.name.as_str());
        }

        if let Some(prev) = previous {
            if param.kind < prev.kind {
                return Err(SignatureError::KindOrder {
                    name: param.name.clone(),
                    kind: param.kind,
                    previous: prev.name.clone(),
                    previous_kind: prev.kind,
                });
            }
        }
        previous = Some(param);
    }

    Ok(())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_var_positional = self.var_positional().is_some();
        let mut parts: Vec<String> = Vec::with_capacity(self.parameters.len() + 2);
        let mut star_written = false;

        for (i, param) in self.parameters.iter().enumerate() {
            if param.kind == Kind::KeywordOnly && !has_var_positional && !star_written {
                parts.push("*".to_string());
                star_written = true;
            }
            parts.push(param.to_string());

            let next_kind = self.parameters.get(i + 1).map(|p| p.kind);
            if param.kind == Kind::PositionalOnly && next_kind != Some(Kind::PositionalOnly) {
                parts.push("/".to_string());
            }
        }

        write!(f, "({})", parts.join(", "))?;
        if let Annotation::Type(t) = &self.return_annotation {
            write!(f, " -> {t}")?;
        }
        Ok(())
    }
}

/// Anything that exposes a signature: a bare [`Signature`] or a callable.
pub trait SignatureSource {
    fn signature(&self) -> &Signature;
}

impl SignatureSource for Signature {
    fn signature(&self) -> &Signature {
        self
    }
}

impl<T: SignatureSource + ?Sized> SignatureSource for &T {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }
}

impl<T: SignatureSource + ?Sized> SignatureSource for Arc<T> {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }
}

impl<T: SignatureSource + ?Sized> SignatureSource for Box<T> {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }
}
