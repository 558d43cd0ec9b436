//! Parsing of the textual signature form produced by `Display`.
//!
//! The grammar is the standard calling-convention punctuation:
//!
//! ```text
//! (a: int, /, b: str = "x", *args: float, c: int = 1, **kwargs: bool) -> str
//! ```
//!
//! Defaults are JSON literals. Annotations are opaque text and may contain
//! nested brackets, braces, parentheses, and string literals.

use std::str::FromStr;

use serde_json::Value;

use crate::error::SignatureError;
use crate::kind::Kind;
use crate::parameter::{Annotation, DefaultValue, Parameter};
use crate::signature::Signature;

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| SignatureError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('(')
            .ok_or_else(|| fail("expected '('"))?;
        let close = top_level_indices(body, ')')
            .first()
            .copied()
            .ok_or_else(|| fail("missing closing ')'"))?;
        let inner = &body[..close];
        let tail = body[close + 1..].trim();

        let return_annotation = if tail.is_empty() {
            Annotation::Empty
        } else {
            let expr = tail
                .strip_prefix("->")
                .ok_or_else(|| fail("expected '->' after parameter list"))?
                .trim();
            if expr.is_empty() {
                return Err(fail("empty return annotation"));
            }
            Annotation::new(expr)
        };

        let parameters = parse_parameters(inner).map_err(|reason| fail(&reason))?;
        Signature::new(parameters, return_annotation)
    }
}

fn parse_parameters(inner: &str) -> Result<Vec<Parameter>, String> {
    let mut parameters: Vec<Parameter> = Vec::new();
    if inner.trim().is_empty() {
        return Ok(parameters);
    }

    let mut default_kind = Kind::PositionalOrKeyword;
    let mut saw_slash = false;
    let mut bare_star = false;

    for item in split_top_level(inner, ',') {
        let item = item.trim();
        match item {
            "" => return Err("empty parameter entry".into()),
            "/" => {
                if saw_slash {
                    return Err("'/' may appear only once".into());
                }
                if default_kind != Kind::PositionalOrKeyword {
                    return Err("'/' must come before '*'".into());
                }
                if parameters.is_empty() {
                    return Err("at least one parameter must precede '/'".into());
                }
                for param in &mut parameters {
                    param.kind = Kind::PositionalOnly;
                }
                saw_slash = true;
            }
            "*" => {
                if default_kind == Kind::KeywordOnly {
                    return Err("'*' may appear only once".into());
                }
                default_kind = Kind::KeywordOnly;
                bare_star = true;
            }
            _ => {
                let param = if let Some(rest) = item.strip_prefix("**") {
                    parse_parameter(rest, Kind::VarKeyword)?
                } else if let Some(rest) = item.strip_prefix('*') {
                    if default_kind == Kind::KeywordOnly {
                        return Err("'*' may appear only once".into());
                    }
                    default_kind = Kind::KeywordOnly;
                    parse_parameter(rest, Kind::VarPositional)?
                } else {
                    parse_parameter(item, default_kind)?
                };
                if param.kind == Kind::KeywordOnly {
                    bare_star = false;
                }
                parameters.push(param);
            }
        }
    }

    if bare_star {
        return Err("named parameters must follow bare '*'".into());
    }
    Ok(parameters)
}

fn parse_parameter(item: &str, kind: Kind) -> Result<Parameter, String> {
    let (lhs, default) = match top_level_indices(item, '=').first() {
        Some(&eq) => (&item[..eq], Some(item[eq + 1..].trim())),
        None => (item, None),
    };
    let (name, annotation) = match top_level_indices(lhs, ':').first() {
        Some(&colon) => (lhs[..colon].trim(), Some(lhs[colon + 1..].trim())),
        None => (lhs.trim(), None),
    };

    let mut param = Parameter::new(name, kind);
    if let Some(annotation) = annotation {
        if annotation.is_empty() {
            return Err(format!("empty annotation for '{name}'"));
        }
        param.annotation = Annotation::new(annotation);
    }
    if let Some(default) = default {
        let value: Value = serde_json::from_str(default)
            .map_err(|e| format!("invalid default for '{name}': {e}"))?;
        param.default = DefaultValue::Value(value);
    }
    Ok(param)
}

/// Byte offsets of `target` outside any brackets or string literals.
fn top_level_indices(s: &str, target: char) -> Vec<usize> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == target && depth == 0 {
            found.push(i);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    found
}

fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for idx in top_level_indices(s, sep) {
        parts.push(&s[start..idx]);
        start = idx + sep.len_utf8();
    }
    parts.push(&s[start..]);
    parts
}
