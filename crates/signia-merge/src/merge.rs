//! The signature merge algorithm.
//!
//! Sources are folded left to right. Parameters are visited kind group by
//! kind group in the fixed [`Kind`] order; the first occurrence of a name
//! places a slot, and later occurrences merge into that slot without moving
//! it. Conflicting occurrences are reconciled by the configured named policy
//! or resolver, or reported as [`MergeError::Conflict`].

use std::collections::{BTreeMap, HashMap};

use signia_types::{Annotation, Kind, Parameter, Signature, SignatureSource};
use tracing::{debug, warn};

use crate::config::MergeOptions;
use crate::conflict::Conflict;
use crate::error::{MergeError, MergeResult};
use crate::resolver::OnConflict;

/// A merged signature together with slot ownership.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    /// The merged signature.
    pub signature: Signature,
    /// For each parameter name, the index of the source whose parameter
    /// occupies the slot.
    pub owners: BTreeMap<String, usize>,
    pub has_var_positional: bool,
    pub has_var_keyword: bool,
}

#[derive(Debug)]
struct Slot {
    param: Parameter,
    owner: usize,
}

/// Merge one or more signatures into a single signature.
///
/// # Examples
///
/// ```
/// use signia_merge::{merge_signatures, MergeOptions};
/// use signia_types::Signature;
///
/// let load: Signature = "(path: str, *, retries: int = 3) -> bytes".parse().unwrap();
/// let audit: Signature = "(*, retries: int = 3, tag: str)".parse().unwrap();
/// let merged = merge_signatures(&[&load, &audit], &MergeOptions::default()).unwrap();
/// assert_eq!(merged.to_string(), "(path: str, *, retries: int = 3, tag: str) -> bytes");
/// ```
pub fn merge_signatures(
    sources: &[&dyn SignatureSource],
    options: &MergeOptions,
) -> MergeResult<Signature> {
    merge_with_owners(sources, options).map(|outcome| outcome.signature)
}

/// Merge signatures, also reporting which source owns each merged slot.
pub fn merge_with_owners(
    sources: &[&dyn SignatureSource],
    options: &MergeOptions,
) -> MergeResult<MergeOutcome> {
    if sources.is_empty() {
        return Err(MergeError::NoSources);
    }

    let mut slots: Vec<Slot> = Vec::new();
    let mut placed: HashMap<String, usize> = HashMap::new();

    for kind in Kind::ALL {
        for (source_index, source) in sources.iter().enumerate() {
            for incoming in source.signature().of_kind(kind) {
                match placed.get(&incoming.name) {
                    Some(&at) => fold(&mut slots[at], incoming, source_index, options)?,
                    None => {
                        debug!(parameter = %incoming.name, source = source_index, %kind, "placed parameter");
                        placed.insert(incoming.name.clone(), slots.len());
                        slots.push(Slot {
                            param: incoming.clone(),
                            owner: source_index,
                        });
                    }
                }
            }
        }
    }

    // A wholesale adoption may have changed a slot's kind; a stable sort moves
    // it into its new kind group without reordering anything else.
    slots.sort_by_key(|slot| slot.param.kind);

    let owners = slots
        .iter()
        .map(|slot| (slot.param.name.clone(), slot.owner))
        .collect();
    let return_annotation = sources
        .iter()
        .rev()
        .map(|source| source.signature().return_annotation())
        .find(|annotation| !annotation.is_empty())
        .cloned()
        .unwrap_or(Annotation::Empty);

    let parameters = slots.into_iter().map(|slot| slot.param).collect();
    let signature = Signature::new(parameters, return_annotation).map_err(|e| {
        warn!(error = %e, "merged signature violates an invariant");
        MergeError::Invariant(e)
    })?;

    Ok(MergeOutcome {
        has_var_positional: signature.var_positional().is_some(),
        has_var_keyword: signature.var_keyword().is_some(),
        signature,
        owners,
    })
}

/// Merge a repeated occurrence of a name into its slot.
///
/// The two occurrences are compared in source order, so "first" always means
/// the lower source index even when a later source placed the slot through an
/// earlier kind group.
fn fold(
    slot: &mut Slot,
    incoming: &Parameter,
    source_index: usize,
    options: &MergeOptions,
) -> MergeResult<()> {
    let name = incoming.name.as_str();
    let incoming_is_later = source_index > slot.owner;
    let (first, second) = if incoming_is_later {
        (&slot.param, incoming)
    } else {
        (incoming, &slot.param)
    };
    let conflicts = Conflict::detect(first, second, options.compare_defaults);

    if conflicts.is_empty() {
        if options.policy.prefers_incoming() == incoming_is_later {
            adopt(slot, incoming, source_index);
        }
        return Ok(());
    }

    match &options.on_conflict {
        None => {
            warn!(parameter = %name, conflicts = conflicts.len(), "unresolved parameter conflict");
            Err(MergeError::Conflict {
                parameter: name.to_string(),
                conflicts,
            })
        }
        Some(OnConflict::Policy(policy)) => {
            let take_second = policy.prefers_incoming(first, second, options.policy);
            let take_incoming = take_second == incoming_is_later;
            debug!(parameter = %name, %policy, take_incoming, "conflict resolved by policy");
            if take_incoming {
                adopt(slot, incoming, source_index);
            }
            Ok(())
        }
        Some(OnConflict::Resolver(resolver)) => {
            let resolved = resolver.resolve(name, first, second, &conflicts)?;
            if resolved.name != name {
                warn!(parameter = %name, returned = %resolved.name, "resolver renamed parameter");
                return Err(MergeError::InvalidResolverResult {
                    parameter: name.to_string(),
                    reason: format!("expected name '{name}', got '{}'", resolved.name),
                });
            }
            if resolved.kind != first.kind {
                warn!(parameter = %name, returned = %resolved.kind, "resolver changed parameter kind");
                return Err(MergeError::InvalidResolverResult {
                    parameter: name.to_string(),
                    reason: format!("expected kind {}, got {}", first.kind, resolved.kind),
                });
            }
            debug!(parameter = %name, "conflict resolved by custom resolver");
            let owner = match (resolved == *second, incoming_is_later) {
                (true, true) | (false, false) => source_index,
                _ => slot.owner,
            };
            slot.param = resolved;
            slot.owner = owner;
            Ok(())
        }
    }
}

fn adopt(slot: &mut Slot, incoming: &Parameter, source_index: usize) {
    slot.param = incoming.clone();
    slot.owner = source_index;
}
