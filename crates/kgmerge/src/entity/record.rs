//! The normalized entity record.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{KgMergeError, Result};

/// Universal root of the Biolink type hierarchy.
pub const DEFAULT_BASE_TYPE: &str = "biolink:NamedThing";

/// A CURIE paired with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub identifier: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub label: String,
}

impl Identifier {
    pub fn new(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: label.into(),
        }
    }
}

/// Normalizer output sometimes carries `"label": null`.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A normalized entity.
///
/// Equality and hashing only look at `id.identifier`, so two versions of the
/// same concept from different sources compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical identifier and label.
    pub id: Identifier,
    /// Equivalent identifiers, unique by identifier string.
    #[serde(default)]
    pub equivalent_identifiers: Vec<Identifier>,
    /// Type path, most specific first, ending at the base type.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Sources that contributed to this entity.
    #[serde(default)]
    pub source_databases: Vec<String>,
    /// Score in [0, 1] assigned by the confidence strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

impl Entity {
    /// Create an entity whose equivalent identifiers contain only its own id.
    pub fn new(
        identifier: impl Into<String>,
        label: impl Into<String>,
        types: Vec<String>,
    ) -> Self {
        let id = Identifier::new(identifier, label);
        Self {
            equivalent_identifiers: vec![id.clone()],
            id,
            types,
            source_databases: Vec::new(),
            confidence_score: None,
        }
    }

    /// Replace the equivalent identifiers.
    pub fn with_equivalents(mut self, equivalents: Vec<Identifier>) -> Self {
        self.equivalent_identifiers = equivalents;
        self
    }

    /// Replace the recorded sources.
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.source_databases = sources;
        self
    }

    /// Set a confidence score.
    pub fn with_confidence(mut self, score: f64) -> Self {
        self.confidence_score = Some(score);
        self
    }

    /// The canonical identifier string.
    pub fn identifier(&self) -> &str {
        &self.id.identifier
    }

    /// The canonical label.
    pub fn label(&self) -> &str {
        &self.id.label
    }

    /// Most specific type tag, if any.
    pub fn most_specific_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// Check the type-list invariant: non-empty, no duplicate tags, ends with `base_type`.
    pub fn validate(&self, source_name: &str, base_type: &str) -> Result<()> {
        let Some(last) = self.types.last() else {
            return Err(KgMergeError::malformed(
                source_name,
                self.identifier(),
                "type list is empty",
            ));
        };
        if last != base_type {
            return Err(KgMergeError::malformed(
                source_name,
                self.identifier(),
                format!("type list ends with '{}', expected '{}'", last, base_type),
            ));
        }

        let mut seen = HashSet::with_capacity(self.types.len());
        if let Some(dup) = self.types.iter().find(|t| !seen.insert(t.as_str())) {
            return Err(KgMergeError::malformed(
                source_name,
                self.identifier(),
                format!("duplicate type tag '{}'", dup),
            ));
        }

        Ok(())
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id.identifier == other.id.identifier
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.identifier.hash(state);
    }
}

/// Entity as found in a source file, before required fields are checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEntity {
    id: Option<Identifier>,
    #[serde(default)]
    equivalent_identifiers: Option<Vec<Identifier>>,
    #[serde(rename = "type")]
    types: Option<Vec<String>>,
    #[serde(default)]
    source_databases: Option<Vec<String>>,
    #[serde(default)]
    confidence_score: Option<f64>,
}

impl RawEntity {
    /// Check required fields and the type-list invariant.
    pub(crate) fn into_entity(
        self,
        source_name: &str,
        key: &str,
        base_type: &str,
    ) -> Result<Entity> {
        let id = self
            .id
            .ok_or_else(|| KgMergeError::malformed(source_name, key, "missing 'id'"))?;
        let types = self
            .types
            .ok_or_else(|| KgMergeError::malformed(source_name, key, "missing 'type'"))?;

        if let Some(score) = self.confidence_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(KgMergeError::malformed(
                    source_name,
                    key,
                    format!("confidence_score {} outside [0, 1]", score),
                ));
            }
        }

        let entity = Entity {
            id,
            equivalent_identifiers: self.equivalent_identifiers.unwrap_or_default(),
            types,
            source_databases: self.source_databases.unwrap_or_default(),
            confidence_score: self.confidence_score,
        };
        entity.validate(source_name, base_type)?;

        Ok(entity)
    }
}
