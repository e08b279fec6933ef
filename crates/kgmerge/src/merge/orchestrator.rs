//! Merge orchestration over N named collections.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::entity::{Entity, EntityCollection, NamedCollection};
use crate::error::{KgMergeError, Result};
use crate::reconcile::{IdentifierConflict, dedupe_identifiers};

use super::config::MergeConfig;
use super::resolver::ConflictResolver;
use super::stats::MergeStatistics;

/// Output of a merge run.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub collection: EntityCollection,
    pub statistics: MergeStatistics,
    pub conflicts: Vec<IdentifierConflict>,
}

impl MergeOutcome {
    pub fn into_parts(self) -> (EntityCollection, MergeStatistics) {
        (self.collection, self.statistics)
    }
}

/// Merges named entity collections into one.
///
/// Collections are folded left to right in the order given: for an id held
/// by several collections the first two versions are resolved first, then
/// the result against the next, and so on.
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    /// Create a merger with default configuration (union).
    pub fn new() -> Self {
        Self::with_config(MergeConfig::default())
    }

    pub fn with_config(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `collections` into a new collection.
    ///
    /// Configuration and every input record are checked before any entity is
    /// merged; a failure returns no partial output.
    pub fn merge(&self, collections: &[NamedCollection]) -> Result<MergeOutcome> {
        if collections.is_empty() {
            return Err(KgMergeError::EmptyInput(
                "at least one collection is required".to_string(),
            ));
        }

        let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
        let mut unique = HashSet::with_capacity(names.len());
        if let Some(dup) = names.iter().find(|n| !unique.insert(**n)) {
            return Err(KgMergeError::InvalidParameter(format!(
                "collection name '{}' given more than once",
                dup
            )));
        }

        let params = self.config.validate(&names)?;
        let strategy = self.config.strategy;

        for collection in collections {
            for entity in collection.entities.entities() {
                entity.validate(&collection.name, &self.config.base_type)?;
            }
        }

        info!(
            %strategy,
            sources = collections.len(),
            "merging {} collections",
            collections.len()
        );

        let resolver = ConflictResolver::new(&self.config, params.weights);

        let mut ids: IndexSet<&str> = IndexSet::new();
        for collection in collections {
            ids.extend(collection.entities.ids());
        }

        let mut output = EntityCollection::new();
        let mut conflicts = Vec::new();
        let mut skipped = 0usize;

        for id in ids {
            let holders: Vec<(&str, &Entity)> = collections
                .iter()
                .filter_map(|c| c.entities.get(id).map(|e| (c.name.as_str(), e)))
                .collect();

            let required = if strategy.keeps_single_source() {
                1
            } else {
                params.min_sources
            };
            if holders.len() < required {
                skipped += 1;
                continue;
            }

            let mut versions = holders
                .iter()
                .map(|(source, entity)| resolver.version(source, entity));
            let Some(first) = versions.next() else {
                continue;
            };

            let mut merged = first;
            if holders.len() == 1 {
                let deduped = dedupe_identifiers(id, &merged.entity.equivalent_identifiers);
                merged.entity.equivalent_identifiers = deduped.identifiers;
                conflicts.extend(deduped.conflicts);
            } else {
                for next in versions {
                    let resolution = resolver.resolve(merged, next);
                    conflicts.extend(resolution.conflicts);
                    merged = resolution.version;
                }
                debug!(entity = id, sources = holders.len(), "merged overlapping entity");
            }

            merged
                .entity
                .validate("merged output", &self.config.base_type)?;
            output.insert_keyed(id, merged.entity);
        }

        info!(
            entities = output.len(),
            skipped,
            conflicts = conflicts.len(),
            "merge complete"
        );

        let input_sizes: BTreeMap<String, usize> = collections
            .iter()
            .map(|c| (c.name.clone(), c.len()))
            .collect();
        let statistics = MergeStatistics::compute(&output)?
            .with_strategy(strategy.as_str())
            .with_input_sizes(input_sizes)
            .with_conflicts(&conflicts);

        Ok(MergeOutcome {
            collection: output,
            statistics,
            conflicts,
        })
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DEFAULT_BASE_TYPE, Identifier};
    use crate::merge::Strategy;

    fn gene(id: &str, label: &str) -> Entity {
        Entity::new(
            id,
            label,
            vec!["biolink:Gene".to_string(), DEFAULT_BASE_TYPE.to_string()],
        )
    }

    fn named(name: &str, entities: Vec<Entity>) -> NamedCollection {
        NamedCollection::new(name, entities.into_iter().collect())
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = Merger::new().merge(&[]).unwrap_err();
        assert!(matches!(err, KgMergeError::EmptyInput(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = named("A", vec![gene("X:1", "Foo")]);
        let err = Merger::new().merge(&[a.clone(), a]).unwrap_err();
        assert!(err.is_strategy_error());
    }

    #[test]
    fn test_malformed_input_aborts() {
        let bad = Entity::new("X:2", "Bad", vec!["biolink:Gene".to_string()]);
        let a = named("A", vec![gene("X:1", "Foo"), bad]);
        let err = Merger::new().merge(&[a]).unwrap_err();
        assert!(matches!(err, KgMergeError::MalformedEntity { .. }));
    }

    #[test]
    fn test_three_way_fold_order() {
        let a = named("A", vec![gene("X:1", "Foo")]);
        let b = named(
            "B",
            vec![gene("X:1", "Foo").with_equivalents(vec![Identifier::new("Y:2", "Foo")])],
        );
        let c = named(
            "C",
            vec![gene("X:1", "Foo").with_equivalents(vec![Identifier::new("Z:3", "Foo")])],
        );

        let outcome = Merger::new().merge(&[a, b, c]).unwrap();
        let merged = outcome.collection.get("X:1").unwrap();

        let ids: Vec<&str> = merged
            .equivalent_identifiers
            .iter()
            .map(|i| i.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["X:1", "Y:2", "Z:3"]);
        assert_eq!(merged.source_databases, vec!["A", "B", "C"]);
        assert_eq!(outcome.statistics.source_overlap.get(&3), Some(&1));
    }

    #[test]
    fn test_confidence_fold_over_three_sources() {
        let a = named("A", vec![gene("X:1", "a")]);
        let b = named("B", vec![gene("X:1", "b")]);
        let c = named("C", vec![gene("X:1", "c")]);

        let config = MergeConfig::new(Strategy::Confidence).with_weight("C", 0.5);
        let outcome = Merger::with_config(config).merge(&[a, b, c]).unwrap();
        let merged = outcome.collection.get("X:1").unwrap();

        // A and B tie at 0.25 + 0.12 = 0.37 and fold to weight 0.5, score 0.37.
        // C scores 0.5 + 0.12 = 0.62, wins, and the two halves average.
        assert_eq!(merged.label(), "c");
        assert!((merged.confidence_score.unwrap() - 0.495).abs() < 1e-9);
        assert_eq!(merged.source_databases, vec!["A", "B", "C"]);
        assert_eq!(outcome.statistics.identifier_conflicts, 2);
        assert_eq!(outcome.conflicts[1].kept_label, "c");
    }

    #[test]
    fn test_intersection_min_sources() {
        let a = named("A", vec![gene("X:1", "Foo"), gene("X:2", "Bar")]);
        let b = named("B", vec![gene("X:1", "Foo")]);
        let c = named("C", vec![gene("X:2", "Bar")]);

        let all = Merger::with_config(MergeConfig::new(Strategy::Intersection))
            .merge(&[a.clone(), b.clone(), c.clone()])
            .unwrap();
        assert!(all.collection.is_empty());

        let config = MergeConfig::new(Strategy::Intersection).with_min_sources(2);
        let two = Merger::with_config(config).merge(&[a, b, c]).unwrap();
        assert_eq!(two.collection.len(), 2);
    }

    #[test]
    fn test_single_source_dedupes_identifiers() {
        let entity = gene("X:1", "Foo").with_equivalents(vec![
            Identifier::new("X:1", "Foo"),
            Identifier::new("X:1", "Other"),
        ]);
        let outcome = Merger::new().merge(&[named("A", vec![entity])]).unwrap();

        let merged = outcome.collection.get("X:1").unwrap();
        assert_eq!(merged.equivalent_identifiers.len(), 1);
        assert_eq!(outcome.statistics.identifier_conflicts, 1);
    }

    #[test]
    fn test_statistics_carry_run_metadata() {
        let a = named("A", vec![gene("X:1", "Foo")]);
        let b = named("B", vec![gene("X:9", "Baz")]);

        let (collection, stats) = Merger::new().merge(&[a, b]).unwrap().into_parts();

        assert_eq!(collection.len(), 2);
        assert_eq!(stats.strategy.as_deref(), Some("union"));
        assert_eq!(stats.input_sizes.get("A"), Some(&1));
        assert_eq!(stats.multi_source_entities, 0);
    }
}
