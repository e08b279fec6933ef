//! Quality checks for a merged collection.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityCollection};

/// Type tags must be prefixed CURIEs such as `biolink:Gene`.
static TYPE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]*:[A-Za-z][A-Za-z0-9_]*$").unwrap());

/// Fields every merged record must carry.
const REQUIRED_FIELDS: [&str; 4] = ["id", "equivalent_identifiers", "type", "source_databases"];

/// Category of a quality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required field is absent from the record.
    MissingField,
    /// `id` is not an object with `identifier` and `label`.
    MalformedId,
    /// An equivalent identifier is not an object with `identifier` and `label`.
    MalformedEquivalent,
    /// The record is not an object or a field has the wrong shape.
    MalformedRecord,
    /// A type tag is not a prefixed CURIE.
    InvalidType,
    /// The type list does not end with the base type.
    MissingBaseType,
    /// No contributing source is recorded.
    MissingSources,
    /// The map key differs from `id.identifier`.
    KeyMismatch,
    /// `id.identifier` is absent from the entity's own equivalent identifiers.
    SelfNotEquivalent,
    /// The same identifier string is listed under more than one entity.
    DuplicateIdentifier,
}

impl IssueKind {
    /// Integrity and consistency problems, as opposed to cross-entity duplicates.
    pub fn is_integrity(&self) -> bool {
        !matches!(self, IssueKind::DuplicateIdentifier)
    }
}

/// A single quality finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub entity_id: String,
    pub message: String,
}

/// Type counts overall and per source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeAnalysis {
    pub total_types: usize,
    pub type_counts: BTreeMap<String, usize>,
    pub source_type_counts: BTreeMap<String, BTreeMap<String, usize>>,
}

/// How sources overlap across entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    /// Count per sorted source combination, joined with `+`.
    pub source_combinations: BTreeMap<String, usize>,
    pub single_source: usize,
    pub multi_source: usize,
}

/// Quality report for a merged collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_entities: usize,
    pub validation_issues: Vec<Issue>,
    pub duplicate_issues: Vec<Issue>,
    pub type_analysis: TypeAnalysis,
    pub source_analysis: SourceAnalysis,
}

impl QualityReport {
    /// Run every check against `collection`.
    pub fn inspect(collection: &EntityCollection, base_type: &str) -> Self {
        let mut validation_issues = check_integrity(collection, base_type);
        validation_issues.extend(check_consistency(collection));

        Self {
            total_entities: collection.len(),
            validation_issues,
            duplicate_issues: check_duplicates(collection),
            type_analysis: analyze_types(collection),
            source_analysis: analyze_sources(collection),
        }
    }

    /// Check a merged document record by record.
    ///
    /// Records with a missing or malformed field are reported and left out of
    /// the remaining checks, which run over every record that reads cleanly.
    pub fn inspect_document(document: &IndexMap<String, Value>, base_type: &str) -> Self {
        let mut structural = Vec::new();
        let mut readable = EntityCollection::new();

        for (key, record) in document {
            let found = check_structure(key, record);
            if !found.is_empty() {
                structural.extend(found);
                continue;
            }
            match serde_json::from_value::<Entity>(record.clone()) {
                Ok(entity) => {
                    readable.insert_keyed(key.as_str(), entity);
                }
                Err(e) => structural.push(issue(
                    IssueKind::MalformedRecord,
                    key,
                    format!("Entity {} could not be read: {}", key, e),
                )),
            }
        }

        let mut report = Self::inspect(&readable, base_type);
        report.total_entities = document.len();
        structural.append(&mut report.validation_issues);
        report.validation_issues = structural;
        report
    }

    /// True when no integrity or consistency issue was found.
    pub fn is_clean(&self) -> bool {
        self.validation_issues.is_empty()
    }

    /// Number of issues of a given kind.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.validation_issues
            .iter()
            .chain(&self.duplicate_issues)
            .filter(|i| i.kind == kind)
            .count()
    }
}

fn issue(kind: IssueKind, entity_id: &str, message: String) -> Issue {
    Issue {
        kind,
        entity_id: entity_id.to_string(),
        message,
    }
}

fn check_structure(key: &str, record: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();
    let Some(fields) = record.as_object() else {
        issues.push(issue(
            IssueKind::MalformedRecord,
            key,
            format!("Entity {} is not an object", key),
        ));
        return issues;
    };

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) {
            issues.push(issue(
                IssueKind::MissingField,
                key,
                format!("Entity {} missing required field: {}", key, field),
            ));
        }
    }

    if fields.get("id").is_some_and(|id| !is_identifier(id)) {
        issues.push(issue(
            IssueKind::MalformedId,
            key,
            format!("Entity {} has malformed id field", key),
        ));
    }

    match fields.get("equivalent_identifiers") {
        Some(Value::Array(list)) => {
            for (index, equivalent) in list.iter().enumerate() {
                if !is_identifier(equivalent) {
                    issues.push(issue(
                        IssueKind::MalformedEquivalent,
                        key,
                        format!(
                            "Entity {} has malformed equivalent_identifier at index {}",
                            key, index
                        ),
                    ));
                }
            }
        }
        Some(_) => issues.push(issue(
            IssueKind::MalformedEquivalent,
            key,
            format!("Entity {} has non-list equivalent_identifiers field", key),
        )),
        None => {}
    }

    match fields.get("type") {
        Some(Value::Array(tags)) => {
            for tag in tags.iter().filter(|t| !t.is_string()) {
                issues.push(issue(
                    IssueKind::InvalidType,
                    key,
                    format!("Entity {} has invalid type: {}", key, tag),
                ));
            }
        }
        Some(_) => issues.push(issue(
            IssueKind::InvalidType,
            key,
            format!("Entity {} has non-list type field", key),
        )),
        None => {}
    }

    issues
}

/// An object with a string `identifier` and a `label` that is a string or null.
fn is_identifier(value: &Value) -> bool {
    value.get("identifier").is_some_and(Value::is_string)
        && value
            .get("label")
            .is_some_and(|label| label.is_string() || label.is_null())
}

fn check_integrity(collection: &EntityCollection, base_type: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (key, entity) in collection.iter() {
        for tag in &entity.types {
            if !TYPE_TAG.is_match(tag) {
                issues.push(issue(
                    IssueKind::InvalidType,
                    key,
                    format!("Entity {} has invalid type: {}", key, tag),
                ));
            }
        }

        if entity.types.last().map(String::as_str) != Some(base_type) {
            issues.push(issue(
                IssueKind::MissingBaseType,
                key,
                format!("Entity {} type list does not end with {}", key, base_type),
            ));
        }

        if entity.source_databases.is_empty() {
            issues.push(issue(
                IssueKind::MissingSources,
                key,
                format!("Entity {} has no source_databases", key),
            ));
        }
    }

    issues
}

fn check_consistency(collection: &EntityCollection) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (key, entity) in collection.iter() {
        if key != entity.identifier() {
            issues.push(issue(
                IssueKind::KeyMismatch,
                key,
                format!(
                    "Entity key {} doesn't match id.identifier {}",
                    key,
                    entity.identifier()
                ),
            ));
        }

        let listed = entity
            .equivalent_identifiers
            .iter()
            .any(|eq| eq.identifier == entity.identifier());
        if !listed {
            issues.push(issue(
                IssueKind::SelfNotEquivalent,
                key,
                format!("Entity {} not found in its own equivalent_identifiers", key),
            ));
        }
    }

    issues
}

fn check_duplicates(collection: &EntityCollection) -> Vec<Issue> {
    let mut owners: IndexMap<&str, Vec<&str>> = IndexMap::new();

    for (key, entity) in collection.iter() {
        let mut identifiers: Vec<&str> = vec![entity.identifier()];
        identifiers.extend(
            entity
                .equivalent_identifiers
                .iter()
                .map(|eq| eq.identifier.as_str()),
        );
        identifiers.sort_unstable();
        identifiers.dedup();

        for identifier in identifiers {
            owners.entry(identifier).or_default().push(key);
        }
    }

    owners
        .into_iter()
        .filter(|(_, entities)| entities.len() > 1)
        .map(|(identifier, entities)| Issue {
            kind: IssueKind::DuplicateIdentifier,
            entity_id: entities[0].to_string(),
            message: format!(
                "Identifier {} appears in multiple entities: {}",
                identifier,
                entities.join(", ")
            ),
        })
        .collect()
}

fn analyze_types(collection: &EntityCollection) -> TypeAnalysis {
    let mut analysis = TypeAnalysis::default();

    for entity in collection.entities() {
        for tag in &entity.types {
            *analysis.type_counts.entry(tag.clone()).or_insert(0) += 1;
            for source in &entity.source_databases {
                *analysis
                    .source_type_counts
                    .entry(source.clone())
                    .or_default()
                    .entry(tag.clone())
                    .or_insert(0) += 1;
            }
        }
    }
    analysis.total_types = analysis.type_counts.len();

    analysis
}

fn analyze_sources(collection: &EntityCollection) -> SourceAnalysis {
    let mut analysis = SourceAnalysis::default();

    for entity in collection.entities() {
        let mut sources: Vec<&str> = entity.source_databases.iter().map(String::as_str).collect();
        sources.sort_unstable();
        *analysis
            .source_combinations
            .entry(sources.join("+"))
            .or_insert(0) += 1;

        match sources.len() {
            0 => {}
            1 => analysis.single_source += 1,
            _ => analysis.multi_source += 1,
        }
    }

    analysis
}
