//! Summary statistics for a merged collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entity::EntityCollection;
use crate::error::Result;
use crate::reconcile::{IdentifierConflict, type_name};

/// Number of conflicts copied into the statistics artifact.
pub const CONFLICT_SAMPLE_SIZE: usize = 20;

/// Summary of a merged collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeStatistics {
    /// Strategy that produced the collection, if known.
    pub strategy: Option<String>,
    pub total_entities: usize,
    /// Entities recorded with more than one source.
    pub multi_source_entities: usize,
    pub average_types: f64,
    pub average_equivalent_identifiers: f64,
    /// Count per full type tag.
    pub entities_by_type: BTreeMap<String, usize>,
    /// Count per type name with the prefix removed.
    pub type_distribution: BTreeMap<String, usize>,
    /// Count per contributing source.
    pub entities_by_source: BTreeMap<String, usize>,
    /// Number of entities by how many sources they came from.
    pub source_overlap: BTreeMap<usize, usize>,
    /// Entities read per input source.
    pub input_sizes: BTreeMap<String, usize>,
    /// Identifier label clashes seen while merging.
    pub identifier_conflicts: usize,
    pub conflict_samples: Vec<IdentifierConflict>,
    /// SHA-256 of the serialized collection.
    pub output_digest: String,
    pub generated_at: String,
}

impl MergeStatistics {
    /// Scan a collection once and summarize it.
    pub fn compute(collection: &EntityCollection) -> Result<Self> {
        let mut entities_by_type = BTreeMap::new();
        let mut type_distribution = BTreeMap::new();
        let mut entities_by_source = BTreeMap::new();
        let mut source_overlap = BTreeMap::new();
        let mut multi_source_entities = 0;
        let mut total_types = 0usize;
        let mut total_identifiers = 0usize;

        for entity in collection.entities() {
            let source_count = entity.source_databases.len();
            *source_overlap.entry(source_count).or_insert(0) += 1;
            if source_count > 1 {
                multi_source_entities += 1;
            }
            for source in &entity.source_databases {
                *entities_by_source.entry(source.clone()).or_insert(0) += 1;
            }

            for tag in &entity.types {
                *entities_by_type.entry(tag.clone()).or_insert(0) += 1;
                *type_distribution
                    .entry(type_name(tag).to_string())
                    .or_insert(0) += 1;
            }

            total_types += entity.types.len();
            total_identifiers += entity.equivalent_identifiers.len();
        }

        let total_entities = collection.len();
        let average = |sum: usize| {
            if total_entities == 0 {
                0.0
            } else {
                sum as f64 / total_entities as f64
            }
        };

        Ok(Self {
            strategy: None,
            total_entities,
            multi_source_entities,
            average_types: average(total_types),
            average_equivalent_identifiers: average(total_identifiers),
            entities_by_type,
            type_distribution,
            entities_by_source,
            source_overlap,
            input_sizes: BTreeMap::new(),
            identifier_conflicts: 0,
            conflict_samples: Vec::new(),
            output_digest: collection_digest(collection)?,
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_input_sizes(mut self, sizes: BTreeMap<String, usize>) -> Self {
        self.input_sizes = sizes;
        self
    }

    pub fn with_conflicts(mut self, conflicts: &[IdentifierConflict]) -> Self {
        self.identifier_conflicts = conflicts.len();
        self.conflict_samples = conflicts.iter().take(CONFLICT_SAMPLE_SIZE).cloned().collect();
        self
    }

    /// Type names ordered by count, highest first.
    pub fn top_types(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut types: Vec<(&str, usize)> = self
            .type_distribution
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types.truncate(limit);
        types
    }
}

/// Hex SHA-256 over the compact JSON form of a collection.
pub fn collection_digest(collection: &EntityCollection) -> Result<String> {
    let bytes = serde_json::to_vec(collection)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DEFAULT_BASE_TYPE, Entity};

    fn sample() -> EntityCollection {
        vec![
            Entity::new(
                "X:1",
                "Foo",
                vec!["biolink:Gene".to_string(), DEFAULT_BASE_TYPE.to_string()],
            )
            .with_sources(vec!["A".to_string(), "B".to_string()]),
            Entity::new("X:2", "Bar", vec![DEFAULT_BASE_TYPE.to_string()])
                .with_sources(vec!["A".to_string()]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_compute_counts() {
        let stats = MergeStatistics::compute(&sample()).unwrap();

        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.multi_source_entities, 1);
        assert_eq!(stats.source_overlap.get(&1), Some(&1));
        assert_eq!(stats.source_overlap.get(&2), Some(&1));
        assert_eq!(stats.entities_by_source.get("A"), Some(&2));
        assert_eq!(stats.entities_by_type.get(DEFAULT_BASE_TYPE), Some(&2));
        assert_eq!(stats.type_distribution.get("Gene"), Some(&1));
        assert!((stats.average_types - 1.5).abs() < 1e-12);
        assert!((stats.average_equivalent_identifiers - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_collection() {
        let stats = MergeStatistics::compute(&EntityCollection::new()).unwrap();
        assert_eq!(stats.total_entities, 0);
        assert_eq!(stats.average_types, 0.0);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = collection_digest(&sample()).unwrap();
        let b = collection_digest(&sample()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_top_types() {
        let stats = MergeStatistics::compute(&sample()).unwrap();
        let top = stats.top_types(1);
        assert_eq!(top, vec![("NamedThing", 2)]);
    }
}
