//! Equivalent-identifier merging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entity::Identifier;

/// The same identifier string was seen with two different labels.
///
/// Not an error: the first label wins and the event is kept for statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierConflict {
    pub entity_id: String,
    pub identifier: String,
    pub kept_label: String,
    pub discarded_label: String,
}

/// Result of merging identifier lists.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMerge {
    pub identifiers: Vec<Identifier>,
    pub conflicts: Vec<IdentifierConflict>,
}

/// Concatenate two identifier lists, collapsing repeated identifier strings.
///
/// Matching is exact and case-sensitive. The first occurrence keeps its
/// position and label. A label clash is reported only when both labels are
/// non-empty.
pub fn merge_identifiers(
    entity_id: &str,
    primary: &[Identifier],
    secondary: &[Identifier],
) -> IdentifierMerge {
    let mut merged = IdentifierMerge {
        identifiers: Vec::with_capacity(primary.len() + secondary.len()),
        conflicts: Vec::new(),
    };
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(primary.len() + secondary.len());

    for candidate in primary.iter().chain(secondary) {
        match index.get(candidate.identifier.as_str()) {
            Some(&pos) => {
                let kept = &merged.identifiers[pos];
                if kept.label != candidate.label
                    && !kept.label.is_empty()
                    && !candidate.label.is_empty()
                {
                    merged.conflicts.push(IdentifierConflict {
                        entity_id: entity_id.to_string(),
                        identifier: candidate.identifier.clone(),
                        kept_label: kept.label.clone(),
                        discarded_label: candidate.label.clone(),
                    });
                }
            }
            None => {
                index.insert(candidate.identifier.as_str(), merged.identifiers.len());
                merged.identifiers.push(candidate.clone());
            }
        }
    }

    merged
}

/// Collapse duplicates within a single list.
pub fn dedupe_identifiers(entity_id: &str, identifiers: &[Identifier]) -> IdentifierMerge {
    merge_identifiers(entity_id, identifiers, &[])
}
