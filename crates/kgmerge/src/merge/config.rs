//! Merge configuration: strategy selection and the lookup tables it needs.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::DEFAULT_BASE_TYPE;
use crate::error::{KgMergeError, Result};

/// How an entity present in several collections is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Keep everything, merging overlapping entities.
    #[default]
    Union,
    /// Keep only entities found in enough collections.
    Intersection,
    /// The version with the higher source-weighted score becomes the base.
    Confidence,
    /// The version whose most specific type ranks higher becomes the base.
    Type,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Union => "union",
            Strategy::Intersection => "intersection",
            Strategy::Confidence => "confidence",
            Strategy::Type => "type",
        }
    }

    /// Whether entities found in a single collection are copied through.
    pub fn keeps_single_source(&self) -> bool {
        !matches!(self, Strategy::Intersection)
    }
}

impl FromStr for Strategy {
    type Err = KgMergeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "union" => Ok(Strategy::Union),
            "intersection" => Ok(Strategy::Intersection),
            "confidence" => Ok(Strategy::Confidence),
            "type" => Ok(Strategy::Type),
            _ => Err(KgMergeError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranks used by the type strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePriority {
    ranks: IndexMap<String, i32>,
    default_rank: i32,
}

impl TypePriority {
    /// An empty table where every tag has `default_rank`.
    pub fn new(default_rank: i32) -> Self {
        Self {
            ranks: IndexMap::new(),
            default_rank,
        }
    }

    /// Set the rank of a tag.
    pub fn with_rank(mut self, tag: impl Into<String>, rank: i32) -> Self {
        self.ranks.insert(tag.into(), rank);
        self
    }

    /// Rank of a single tag. Matching is exact.
    pub fn rank(&self, tag: &str) -> i32 {
        self.ranks.get(tag).copied().unwrap_or(self.default_rank)
    }

    /// Rank of a type path, taken from its most specific tag.
    pub fn rank_of(&self, types: &[String]) -> i32 {
        types
            .first()
            .map(|tag| self.rank(tag))
            .unwrap_or(self.default_rank)
    }
}

impl Default for TypePriority {
    fn default() -> Self {
        Self::new(0)
            .with_rank("biolink:Gene", 10)
            .with_rank("biolink:Protein", 9)
            .with_rank("biolink:ChemicalEntity", 8)
            .with_rank("biolink:AnatomicalEntity", 7)
            .with_rank("biolink:Disease", 6)
            .with_rank("biolink:OrganismTaxon", 5)
            .with_rank(DEFAULT_BASE_TYPE, 1)
    }
}

/// Parameters of the confidence strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Explicit source weights in [0, 1]. Sources not listed share the remainder.
    pub weights: IndexMap<String, f64>,
    /// Per-source bonus added to a heuristic score.
    pub source_bonus: IndexMap<String, f64>,
    /// Bonus for sources missing from `source_bonus`.
    pub default_bonus: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        let mut source_bonus = IndexMap::new();
        source_bonus.insert("PrimeKG".to_string(), 0.1);
        Self {
            weights: IndexMap::new(),
            source_bonus,
            default_bonus: 0.05,
        }
    }
}

impl ConfidenceConfig {
    /// Bonus for a source.
    pub fn bonus(&self, source: &str) -> f64 {
        self.source_bonus
            .get(source)
            .copied()
            .unwrap_or(self.default_bonus)
    }

    /// Assign a weight to every source.
    ///
    /// Explicit weights are checked against [0, 1] and must not sum past 1;
    /// the rest is split evenly across the sources without one.
    pub fn resolve_weights(&self, sources: &[&str]) -> Result<SourceWeights> {
        let mut explicit_total = 0.0;
        for (name, &weight) in &self.weights {
            if !sources.contains(&name.as_str()) {
                return Err(KgMergeError::InvalidParameter(format!(
                    "weight given for unknown source '{}'",
                    name
                )));
            }
            if !(0.0..=1.0).contains(&weight) {
                return Err(KgMergeError::InvalidParameter(format!(
                    "weight for '{}' must be within [0, 1], got {}",
                    name, weight
                )));
            }
            explicit_total += weight;
        }
        if explicit_total > 1.0 + WEIGHT_EPSILON {
            return Err(KgMergeError::InvalidParameter(format!(
                "source weights sum to {:.3}, which exceeds 1",
                explicit_total
            )));
        }

        let unweighted = sources
            .iter()
            .filter(|s| !self.weights.contains_key(**s))
            .count();
        let share = if unweighted == 0 {
            0.0
        } else {
            (1.0 - explicit_total).max(0.0) / unweighted as f64
        };

        let weights = sources
            .iter()
            .map(|s| {
                let w = self.weights.get(*s).copied().unwrap_or(share);
                (s.to_string(), w)
            })
            .collect();

        Ok(SourceWeights { weights })
    }
}

const WEIGHT_EPSILON: f64 = 1e-9;

/// Weight of every input source, fixed for one merge call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceWeights {
    weights: IndexMap<String, f64>,
}

impl SourceWeights {
    pub fn get(&self, source: &str) -> f64 {
        self.weights.get(source).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Configuration for a merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Active strategy.
    pub strategy: Strategy,
    /// Tag every type path must end with.
    pub base_type: String,
    /// Ranks for the type strategy.
    pub type_priority: TypePriority,
    /// Weights and bonuses for the confidence strategy.
    pub confidence: ConfidenceConfig,
    /// Score differences at or below this are ties.
    pub tie_threshold: f64,
    /// Minimum number of collections an id must appear in under
    /// intersection (None = all of them). Rejected for other strategies.
    pub min_sources: Option<usize>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            base_type: DEFAULT_BASE_TYPE.to_string(),
            type_priority: TypePriority::default(),
            confidence: ConfidenceConfig::default(),
            tie_threshold: 1e-9,
            min_sources: None,
        }
    }
}

impl MergeConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, source: impl Into<String>, weight: f64) -> Self {
        self.confidence.weights.insert(source.into(), weight);
        self
    }

    pub fn with_min_sources(mut self, min_sources: usize) -> Self {
        self.min_sources = Some(min_sources);
        self
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = base_type.into();
        self
    }

    pub fn with_type_priority(mut self, type_priority: TypePriority) -> Self {
        self.type_priority = type_priority;
        self
    }

    /// Check parameters against the source list before any entity is touched.
    pub fn validate(&self, sources: &[&str]) -> Result<ValidatedParams> {
        if self.base_type.trim().is_empty() {
            return Err(KgMergeError::InvalidParameter(
                "base type must not be empty".to_string(),
            ));
        }
        if !self.tie_threshold.is_finite() || self.tie_threshold < 0.0 {
            return Err(KgMergeError::InvalidParameter(format!(
                "tie threshold must be a non-negative number, got {}",
                self.tie_threshold
            )));
        }

        let weights = self.confidence.resolve_weights(sources)?;

        let min_sources = match self.min_sources {
            Some(_) if self.strategy != Strategy::Intersection => {
                return Err(KgMergeError::InvalidParameter(format!(
                    "min_sources only applies to the intersection strategy, not {}",
                    self.strategy
                )));
            }
            Some(k) if k == 0 || k > sources.len() => {
                return Err(KgMergeError::InvalidParameter(format!(
                    "min_sources must be between 1 and {}, got {}",
                    sources.len(),
                    k
                )));
            }
            Some(k) => k,
            None => sources.len(),
        };

        Ok(ValidatedParams {
            weights,
            min_sources,
        })
    }
}

/// Parameters derived from a [`MergeConfig`] for one concrete set of sources.
#[derive(Debug, Clone)]
pub struct ValidatedParams {
    pub weights: SourceWeights,
    pub min_sources: usize,
}
