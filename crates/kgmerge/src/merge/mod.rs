//! Merge engine.
//!
//! Given several entity collections keyed by CURIE, produce one collection in
//! which versions of the same id are resolved under a [`Strategy`]:
//!
//! | Strategy | Overlapping id | Id in one collection |
//! |---|---|---|
//! | `union` | merge types and identifiers | copied |
//! | `intersection` | merge types and identifiers | dropped |
//! | `confidence` | higher score is the base, rest merged in | copied |
//! | `type` | higher-ranked type is the base, rest merged in | copied |
//!
//! # Usage
//!
//! ```
//! use kgmerge::{Entity, MergeConfig, Merger, NamedCollection, Strategy};
//!
//! let gene = |label: &str| {
//!     Entity::new("NCBIGene:7157", label, vec![
//!         "biolink:Gene".to_string(),
//!         "biolink:NamedThing".to_string(),
//!     ])
//! };
//! let primekg = NamedCollection::new("PrimeKG", [gene("TP53")].into_iter().collect());
//! let semmed = NamedCollection::new("SemMed", [gene("TP53")].into_iter().collect());
//!
//! let merger = Merger::with_config(MergeConfig::new(Strategy::Union));
//! let outcome = merger.merge(&[primekg, semmed]).unwrap();
//!
//! let tp53 = outcome.collection.get("NCBIGene:7157").unwrap();
//! assert_eq!(tp53.source_databases, vec!["PrimeKG", "SemMed"]);
//! ```

mod config;
mod orchestrator;
mod resolver;
mod stats;

pub use config::{
    ConfidenceConfig, MergeConfig, SourceWeights, Strategy, TypePriority, ValidatedParams,
};
pub use orchestrator::{MergeOutcome, Merger};
pub use resolver::{ConflictResolver, Outcome, Resolution, Version};
pub use stats::{CONFLICT_SAMPLE_SIZE, MergeStatistics, collection_digest};
