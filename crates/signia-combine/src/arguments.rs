//! Call arguments and their binding to a signature.
//!
//! Binding follows the standard calling convention:
//!
//! 1. Positional values fill positional-only, then positional-or-keyword
//!    parameters; the excess goes to `*args` or is an error.
//! 2. Keywords bind by name to positional-or-keyword and keyword-only
//!    parameters; anything else goes to `**kwargs` or is an error.
//! 3. Required parameters left unbound are an error.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use signia_types::{Kind, Signature};
use tracing::trace;

use crate::error::{BindingError, CombineError, CombineResult};

/// Positional and keyword arguments supplied to a call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub keywords: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// Arguments bound to the parameters of one signature.
///
/// `*args` is stored as a JSON array and `**kwargs` as a JSON object under
/// the variadic parameter's name.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundArguments<'s> {
    signature: &'s Signature,
    arguments: BTreeMap<String, Value>,
}

impl<'s> BoundArguments<'s> {
    /// The signature these arguments are bound to.
    pub fn signature(&self) -> &'s Signature {
        self.signature
    }

    pub fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Deserialize a bound argument into a concrete type.
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> CombineResult<T> {
        let value = self.arguments.get(name).ok_or_else(|| CombineError::Argument {
            name: name.to_string(),
            reason: "not bound".into(),
        })?;
        serde_json::from_value(value.clone()).map_err(|e| CombineError::Argument {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fill unbound parameters with their defaults, `*args` with an empty
    /// array, and `**kwargs` with an empty object.
    pub fn apply_defaults(&mut self) {
        for param in self.signature {
            if self.arguments.contains_key(&param.name) {
                continue;
            }
            let value = match param.kind {
                Kind::VarPositional => Value::Array(Vec::new()),
                Kind::VarKeyword => Value::Object(Map::new()),
                _ => match param.default.value() {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            self.arguments.insert(param.name.clone(), value);
        }
    }

    /// Re-derive the arguments another signature should receive.
    ///
    /// Values are taken by parameter name. Bound names the target does not
    /// declare are ignored. A required target parameter with no bound value
    /// is [`BindingError::MissingArgument`].
    pub fn project(&self, target: &Signature) -> Result<Arguments, BindingError> {
        let mut out = Arguments::new();
        // Defaults of optional positionals left unbound. They are only sent
        // when a later positional value needs the slots before it filled.
        let mut skipped: Vec<Value> = Vec::new();

        for param in target {
            let bound = self.arguments.get(&param.name);
            match param.kind {
                Kind::PositionalOnly | Kind::PositionalOrKeyword => match bound {
                    Some(v) => {
                        out.positional.append(&mut skipped);
                        out.positional.push(v.clone());
                    }
                    None => match param.default.value() {
                        Some(default) => skipped.push(default.clone()),
                        None => return Err(BindingError::MissingArgument(param.name.clone())),
                    },
                },
                Kind::VarPositional => match bound {
                    Some(Value::Array(items)) => {
                        if !items.is_empty() {
                            out.positional.append(&mut skipped);
                            out.positional.extend(items.iter().cloned());
                        }
                    }
                    Some(_) => {
                        return Err(BindingError::InvalidVariadic {
                            name: param.name.clone(),
                            expected: "an array",
                        })
                    }
                    None => {}
                },
                Kind::KeywordOnly => match bound {
                    Some(v) => {
                        out.keywords.insert(param.name.clone(), v.clone());
                    }
                    None if param.has_default() => {}
                    None => return Err(BindingError::MissingArgument(param.name.clone())),
                },
                Kind::VarKeyword => match bound {
                    Some(Value::Object(extra)) => {
                        for (key, value) in extra {
                            out.keywords.insert(key.clone(), value.clone());
                        }
                    }
                    Some(_) => {
                        return Err(BindingError::InvalidVariadic {
                            name: param.name.clone(),
                            expected: "an object",
                        })
                    }
                    None => {}
                },
            }
        }

        Ok(out)
    }
}

/// Bind arguments to a signature.
pub fn bind(signature: &Signature, args: Arguments) -> Result<BoundArguments<'_>, BindingError> {
    let Arguments {
        positional,
        keywords,
    } = args;
    let mut arguments = BTreeMap::new();

    let positional_params: Vec<&str> = signature
        .iter()
        .filter(|p| p.kind.accepts_positional())
        .map(|p| p.name.as_str())
        .collect();
    let given = positional.len();
    let mut values = positional.into_iter();
    for name in &positional_params {
        match values.next() {
            Some(value) => {
                arguments.insert(name.to_string(), value);
            }
            None => break,
        }
    }
    let excess: Vec<Value> = values.collect();
    if !excess.is_empty() {
        match signature.var_positional() {
            Some(var) => {
                arguments.insert(var.name.clone(), Value::Array(excess));
            }
            None => {
                return Err(BindingError::TooManyPositional {
                    expected: positional_params.len(),
                    given,
                })
            }
        }
    }

    let var_keyword = signature.var_keyword();
    let mut extra_keywords = Map::new();
    for (key, value) in keywords {
        let param = signature.get(&key);
        match param.map(|p| p.kind) {
            Some(kind) if kind.accepts_keyword() => {
                if arguments.contains_key(&key) {
                    return Err(BindingError::MultipleValues(key));
                }
                arguments.insert(key, value);
            }
            Some(Kind::PositionalOnly) if var_keyword.is_none() => {
                return Err(BindingError::PositionalOnlyAsKeyword(key));
            }
            _ if var_keyword.is_some() => {
                extra_keywords.insert(key, value);
            }
            _ => return Err(BindingError::UnexpectedKeyword(key)),
        }
    }
    if let Some(var) = var_keyword {
        if !extra_keywords.is_empty() {
            arguments.insert(var.name.clone(), Value::Object(extra_keywords));
        }
    }

    if let Some(missing) = signature
        .iter()
        .find(|p| p.is_required() && !arguments.contains_key(&p.name))
    {
        return Err(BindingError::MissingArgument(missing.name.clone()));
    }

    trace!(bound = arguments.len(), "arguments bound");
    Ok(BoundArguments {
        signature,
        arguments,
    })
}
