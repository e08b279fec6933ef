//! Conflict resolution between two versions of the same entity.

use tracing::debug;

use crate::entity::Entity;
use crate::reconcile::{IdentifierConflict, merge_identifiers, reconcile_types};

use super::config::{ConfidenceConfig, MergeConfig, SourceWeights, Strategy, TypePriority};

/// One version of an entity as it moves through the fold.
///
/// `weight` is the summed weight of every source folded into this version.
#[derive(Debug, Clone)]
pub struct Version {
    pub entity: Entity,
    pub weight: f64,
}

/// Which side became the base of a resolved entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winner; the left version stays the base.
    Merged,
    /// The left version won outright.
    LeftKept,
    /// The right version won outright.
    RightKept,
}

/// Result of resolving two versions.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub version: Version,
    pub outcome: Outcome,
    pub conflicts: Vec<IdentifierConflict>,
}

/// Resolves overlapping entities according to the active strategy.
///
/// All tables are fixed at construction, so the resolver is a pure function
/// of its two inputs.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    strategy: Strategy,
    base_type: String,
    type_priority: TypePriority,
    confidence: ConfidenceConfig,
    weights: SourceWeights,
    tie_threshold: f64,
}

impl ConflictResolver {
    /// Create a resolver from a configuration and resolved source weights.
    pub fn new(config: &MergeConfig, weights: SourceWeights) -> Self {
        Self {
            strategy: config.strategy,
            base_type: config.base_type.clone(),
            type_priority: config.type_priority.clone(),
            confidence: config.confidence.clone(),
            weights,
            tie_threshold: config.tie_threshold,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Wrap an entity from `source` as a fold input.
    ///
    /// Provenance already recorded on the entity is kept; otherwise the
    /// source name is recorded.
    pub fn version(&self, source: &str, entity: &Entity) -> Version {
        let mut entity = entity.clone();
        if entity.source_databases.is_empty() {
            entity.source_databases = vec![source.to_string()];
        }
        Version {
            entity,
            weight: self.weights.get(source),
        }
    }

    /// Score of a version: the recorded score if present, else a heuristic
    /// from its weight, identifier count, type depth and source bonus.
    pub fn score(&self, version: &Version) -> f64 {
        if let Some(score) = version.entity.confidence_score {
            return score;
        }

        let entity = &version.entity;
        let equiv_bonus = (entity.equivalent_identifiers.len() as f64 * 0.05).min(0.2);
        let type_bonus = (entity.types.len() as f64 * 0.01).min(0.1);
        let source_bonus = entity
            .source_databases
            .first()
            .map(|s| self.confidence.bonus(s))
            .unwrap_or(self.confidence.default_bonus);

        (version.weight + equiv_bonus + type_bonus + source_bonus).min(1.0)
    }

    /// Resolve `left` (earlier in fold order) against `right`.
    pub fn resolve(&self, left: Version, right: Version) -> Resolution {
        match self.strategy {
            Strategy::Union | Strategy::Intersection => {
                let score = left.entity.confidence_score.or(right.entity.confidence_score);
                self.combine(left, right, Outcome::Merged, score)
            }
            Strategy::Confidence => self.resolve_by_confidence(left, right),
            Strategy::Type => self.resolve_by_type(left, right),
        }
    }

    fn resolve_by_confidence(&self, left: Version, right: Version) -> Resolution {
        let left_score = self.score(&left);
        let right_score = self.score(&right);

        let outcome = if right_score - left_score > self.tie_threshold {
            Outcome::RightKept
        } else if left_score - right_score > self.tie_threshold {
            Outcome::LeftKept
        } else {
            Outcome::Merged
        };

        let total = left.weight + right.weight;
        let combined = if total > 0.0 {
            (left.weight * left_score + right.weight * right_score) / total
        } else {
            (left_score + right_score) / 2.0
        };

        debug!(
            entity = left.entity.identifier(),
            left_score, right_score, combined, ?outcome, "confidence resolution"
        );

        self.combine(left, right, outcome, Some(combined.clamp(0.0, 1.0)))
    }

    fn resolve_by_type(&self, left: Version, right: Version) -> Resolution {
        let left_rank = self.type_priority.rank_of(&left.entity.types);
        let right_rank = self.type_priority.rank_of(&right.entity.types);

        let outcome = match right_rank.cmp(&left_rank) {
            std::cmp::Ordering::Greater => Outcome::RightKept,
            std::cmp::Ordering::Less => Outcome::LeftKept,
            std::cmp::Ordering::Equal => Outcome::Merged,
        };

        debug!(
            entity = left.entity.identifier(),
            left_rank, right_rank, ?outcome, "type resolution"
        );

        let (base_score, other_score) = match outcome {
            Outcome::RightKept => (right.entity.confidence_score, left.entity.confidence_score),
            Outcome::Merged | Outcome::LeftKept => {
                (left.entity.confidence_score, right.entity.confidence_score)
            }
        };
        self.combine(left, right, outcome, base_score.or(other_score))
    }

    /// Merge the two versions onto whichever one the outcome names as base.
    ///
    /// Sources stay in fold order regardless of which side wins.
    fn combine(
        &self,
        left: Version,
        right: Version,
        outcome: Outcome,
        confidence_score: Option<f64>,
    ) -> Resolution {
        let mut sources = left.entity.source_databases.clone();
        for source in &right.entity.source_databases {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        let weight = left.weight + right.weight;

        let (base, other) = match outcome {
            Outcome::RightKept => (right.entity, left.entity),
            Outcome::Merged | Outcome::LeftKept => (left.entity, right.entity),
        };

        let types = reconcile_types(&base.types, &other.types, &self.base_type);
        let identifiers = merge_identifiers(
            base.identifier(),
            &base.equivalent_identifiers,
            &other.equivalent_identifiers,
        );
        for conflict in &identifiers.conflicts {
            debug!(
                entity = %conflict.entity_id,
                identifier = %conflict.identifier,
                kept = %conflict.kept_label,
                discarded = %conflict.discarded_label,
                "identifier label conflict"
            );
        }

        let entity = Entity {
            id: base.id,
            equivalent_identifiers: identifiers.identifiers,
            types,
            source_databases: sources,
            confidence_score,
        };

        Resolution {
            version: Version { entity, weight },
            outcome,
            conflicts: identifiers.conflicts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DEFAULT_BASE_TYPE, Identifier};

    fn entity(id: &str, label: &str, types: &[&str], equivalents: &[(&str, &str)]) -> Entity {
        let mut tags: Vec<String> = types.iter().map(|s| s.to_string()).collect();
        tags.push(DEFAULT_BASE_TYPE.to_string());
        Entity::new(id, label, tags).with_equivalents(
            equivalents
                .iter()
                .map(|(i, l)| Identifier::new(*i, *l))
                .collect(),
        )
    }

    fn resolver(config: MergeConfig) -> ConflictResolver {
        let params = config.validate(&["A", "B"]).unwrap();
        ConflictResolver::new(&config, params.weights)
    }

    #[test]
    fn test_union_merges_fields() {
        let r = resolver(MergeConfig::new(Strategy::Union));
        let a = entity("X:1", "Foo", &["biolink:Gene"], &[("X:1", "Foo")]);
        let b = entity("X:1", "Foo", &["biolink:BiologicalEntity"], &[("Y:2", "FooAlt")]);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        let merged = res.version.entity;

        assert_eq!(res.outcome, Outcome::Merged);
        assert_eq!(
            merged.types,
            vec!["biolink:Gene", "biolink:BiologicalEntity", DEFAULT_BASE_TYPE]
        );
        assert_eq!(merged.equivalent_identifiers.len(), 2);
        assert_eq!(merged.source_databases, vec!["A", "B"]);
        assert!(merged.confidence_score.is_none());
    }

    #[test]
    fn test_confidence_prefers_heavier_source() {
        let r = resolver(MergeConfig::new(Strategy::Confidence).with_weight("B", 0.9));
        let a = entity("X:1", "Left label", &["biolink:Gene"], &[("X:1", "Left label")]);
        let b = entity("X:1", "Right label", &["biolink:Protein"], &[("X:1", "Right label")]);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        let merged = res.version.entity;

        assert_eq!(res.outcome, Outcome::RightKept);
        assert_eq!(merged.label(), "Right label");
        assert_eq!(merged.types[0], "biolink:Protein");
        assert!(merged.types.contains(&"biolink:Gene".to_string()));
        assert_eq!(merged.source_databases, vec!["A", "B"]);
        assert_eq!(res.conflicts.len(), 1);

        let score = merged.confidence_score.unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_confidence_tie_keeps_left() {
        let r = resolver(MergeConfig::new(Strategy::Confidence));
        let a = entity("X:1", "Left", &["biolink:Gene"], &[("X:1", "Left")]);
        let b = entity("X:1", "Right", &["biolink:Gene"], &[("X:1", "Left")]);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        assert_eq!(res.outcome, Outcome::Merged);
        assert_eq!(res.version.entity.label(), "Left");
    }

    #[test]
    fn test_confidence_uses_recorded_scores() {
        let r = resolver(MergeConfig::new(Strategy::Confidence));
        let a = entity("X:1", "Left", &["biolink:Gene"], &[]).with_confidence(0.2);
        let b = entity("X:1", "Right", &["biolink:Gene"], &[]).with_confidence(0.8);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        assert_eq!(res.outcome, Outcome::RightKept);
        let combined = res.version.entity.confidence_score.unwrap();
        assert!((combined - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_heuristic_score() {
        let r = resolver(MergeConfig::new(Strategy::Confidence).with_weight("A", 0.6));
        let a = entity("X:1", "Foo", &["biolink:Gene"], &[("X:1", "Foo"), ("Y:2", "Foo")]);
        let version = r.version("A", &a);

        // 0.6 weight + 2 * 0.05 identifiers + 2 * 0.01 types + 0.05 bonus
        assert!((r.score(&version) - 0.77).abs() < 1e-9);
    }

    #[test]
    fn test_type_priority_picks_base() {
        let r = resolver(MergeConfig::new(Strategy::Type));
        let a = entity("X:1", "Disease label", &["biolink:Disease"], &[("X:1", "Disease label")]);
        let b = entity("X:1", "Gene label", &["biolink:Gene"], &[("Z:3", "Gene label")]);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        let merged = res.version.entity;

        assert_eq!(res.outcome, Outcome::RightKept);
        assert_eq!(merged.label(), "Gene label");
        assert_eq!(
            merged.types,
            vec!["biolink:Gene", "biolink:Disease", DEFAULT_BASE_TYPE]
        );
        assert_eq!(merged.equivalent_identifiers[0].identifier, "Z:3");
    }

    #[test]
    fn test_type_winner_keeps_its_own_score() {
        let r = resolver(MergeConfig::new(Strategy::Type));
        let a = entity("X:1", "as disease", &["biolink:Disease"], &[]).with_confidence(0.2);
        let b = entity("X:1", "as gene", &["biolink:Gene"], &[]).with_confidence(0.9);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        assert_eq!(res.outcome, Outcome::RightKept);
        assert_eq!(res.version.entity.confidence_score, Some(0.9));

        let unscored = entity("X:1", "as gene", &["biolink:Gene"], &[]);
        let res = r.resolve(r.version("A", &a), r.version("B", &unscored));
        assert_eq!(res.version.entity.confidence_score, Some(0.2));
    }

    #[test]
    fn test_type_tie_falls_back_to_union() {
        let r = resolver(MergeConfig::new(Strategy::Type));
        let a = entity("X:1", "Left", &["biolink:Cell"], &[]);
        let b = entity("X:1", "Right", &["biolink:Cell"], &[]);

        let res = r.resolve(r.version("A", &a), r.version("B", &b));
        assert_eq!(res.outcome, Outcome::Merged);
        assert_eq!(res.version.entity.label(), "Left");
    }

    #[test]
    fn test_version_keeps_existing_provenance() {
        let r = resolver(MergeConfig::default());
        let a = entity("X:1", "Foo", &[], &[]).with_sources(vec!["PrimeKG".to_string()]);
        assert_eq!(r.version("A", &a).entity.source_databases, vec!["PrimeKG"]);
    }
}
