use std::fmt;

use serde::{Deserialize, Serialize};
use signia_types::{differing_attributes, Attribute, AttributeValue, Parameter};

/// A detected attribute mismatch between two same-named parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Name shared by both parameters.
    pub parameter: String,
    /// The attribute that differs.
    pub attribute: Attribute,
    /// Value held by the slot before this merge step.
    pub existing: AttributeValue,
    /// Value carried by the incoming parameter.
    pub incoming: AttributeValue,
}

impl Conflict {
    /// Detect every conflict between the current slot value and an incoming
    /// parameter of the same name.
    ///
    /// Kind and annotation are always compared; defaults only when
    /// `compare_defaults` is set.
    pub fn detect(existing: &Parameter, incoming: &Parameter, compare_defaults: bool) -> Vec<Self> {
        differing_attributes(existing, incoming, compare_defaults)
            .into_iter()
            .map(|attribute| Self {
                parameter: existing.name.clone(),
                attribute,
                existing: attribute.value_of(existing),
                incoming: attribute.value_of(incoming),
            })
            .collect()
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} vs {}", self.attribute, self.existing, self.incoming)
    }
}
