//! Parameter-level diff between two signatures.
//!
//! Parameters are matched by name. The diff detects additions, removals,
//! position changes, and attribute modifications, plus a change of return
//! annotation.

use signia_types::{differing_attributes, Annotation, Attribute, AttributeValue, Parameter, SignatureSource};

/// The result of comparing two signatures.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignatureDiff {
    /// Parameter changes, in the order of the old signature then the new one.
    pub changes: Vec<ParameterChange>,
    /// `Some((old, new))` if the return annotations differ.
    pub return_annotation: Option<(Annotation, Annotation)>,
}

impl SignatureDiff {
    /// Returns `true` if the signatures are identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.return_annotation.is_none()
    }

    /// Number of parameter changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ParameterChange::Added { .. }))
            .count()
    }

    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ParameterChange::Removed { .. }))
            .count()
    }

    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, ParameterChange::Modified { .. }))
            .count()
    }
}

/// A single parameter-level change.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterChange {
    /// A parameter only present in the new signature.
    Added { parameter: Parameter },
    /// A parameter only present in the old signature.
    Removed { parameter: Parameter },
    /// A parameter present in both but at a different index.
    Moved { name: String, from: usize, to: usize },
    /// A parameter present in both with one differing attribute.
    Modified {
        name: String,
        attribute: Attribute,
        old: AttributeValue,
        new: AttributeValue,
    },
}

/// Compute the diff between two signatures.
pub fn diff_signatures(old: &dyn SignatureSource, new: &dyn SignatureSource) -> SignatureDiff {
    let (old, new) = (old.signature(), new.signature());
    let mut changes = Vec::new();

    for (from, old_param) in old.iter().enumerate() {
        let Some(to) = new.position(&old_param.name) else {
            changes.push(ParameterChange::Removed {
                parameter: old_param.clone(),
            });
            continue;
        };
        let new_param = &new.parameters()[to];
        if from != to {
            changes.push(ParameterChange::Moved {
                name: old_param.name.clone(),
                from,
                to,
            });
        }
        for attribute in differing_attributes(old_param, new_param, true) {
            changes.push(ParameterChange::Modified {
                name: old_param.name.clone(),
                attribute,
                old: attribute.value_of(old_param),
                new: attribute.value_of(new_param),
            });
        }
    }

    for new_param in new.iter() {
        if !old.contains(&new_param.name) {
            changes.push(ParameterChange::Added {
                parameter: new_param.clone(),
            });
        }
    }

    let return_annotation = (old.return_annotation() != new.return_annotation())
        .then(|| (old.return_annotation().clone(), new.return_annotation().clone()));

    SignatureDiff {
        changes,
        return_annotation,
    }
}
