//! Entity collections keyed by identifier.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{KgMergeError, Result};

use super::record::{Entity, RawEntity};

/// Mapping from entity id to entity.
///
/// Keeps insertion order so that serialized output is stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCollection {
    entities: IndexMap<String, Entity>,
}

impl EntityCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a source document, validating every record.
    ///
    /// Fails on the first malformed record; nothing is returned for a
    /// partially valid document.
    pub fn from_json_str(source_name: &str, json: &str, base_type: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(json)?;
        Self::from_raw(source_name, raw, base_type)
    }

    pub(crate) fn from_raw(
        source_name: &str,
        raw: IndexMap<String, serde_json::Value>,
        base_type: &str,
    ) -> Result<Self> {
        let mut entities = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let record: RawEntity = serde_json::from_value(value)
                .map_err(|e| KgMergeError::malformed(source_name, &key, e.to_string()))?;
            let entity = record.into_entity(source_name, &key, base_type)?;
            entities.insert(key, entity);
        }
        Ok(Self { entities })
    }

    /// Insert an entity under its own identifier, replacing any previous one.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.identifier().to_string(), entity)
    }

    /// Insert an entity under an explicit key.
    pub fn insert_keyed(&mut self, key: impl Into<String>, entity: Entity) -> Option<Entity> {
        self.entities.insert(key.into(), entity)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over `(id, entity)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over entity ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

impl FromIterator<Entity> for EntityCollection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entity in iter {
            collection.insert(entity);
        }
        collection
    }
}

/// A source collection tagged with the name recorded as provenance.
#[derive(Debug, Clone)]
pub struct NamedCollection {
    pub name: String,
    pub entities: EntityCollection,
}

impl NamedCollection {
    pub fn new(name: impl Into<String>, entities: EntityCollection) -> Self {
        Self {
            name: name.into(),
            entities,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
