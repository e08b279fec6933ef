//! kgmerge: merge normalized biomedical knowledge-graph node sets.
//!
//! Node tables from BioKDE, iKraph, PrimeKG and SemMedDB are normalized
//! upstream into JSON documents keyed by CURIE. This crate unions those
//! documents into a single entity set, reconciling type hierarchies and
//! equivalent identifiers and recording which sources contributed.
//!
//! # Core Principles
//!
//! - **Pure**: inputs are never modified; every lookup table is passed in
//! - **All-or-nothing**: a malformed record or bad parameter aborts the whole merge
//! - **Deterministic**: the same inputs and configuration give the same output
//!
//! # Example
//!
//! ```no_run
//! use kgmerge::persistence::{load_collection, save_collection};
//! use kgmerge::{MergeConfig, Merger, Strategy};
//!
//! let base = "biolink:NamedThing";
//! let primekg = load_collection("PrimeKG", "primekg_normalized.json", base).unwrap();
//! let semmed = load_collection("SemMed", "semmed_normalized.json", base).unwrap();
//!
//! let config = MergeConfig::new(Strategy::Confidence).with_weight("PrimeKG", 0.6);
//! let outcome = Merger::with_config(config).merge(&[primekg, semmed]).unwrap();
//!
//! println!("Entities: {}", outcome.statistics.total_entities);
//! save_collection("combined.json", &outcome.collection).unwrap();
//! ```

pub mod entity;
pub mod error;
pub mod export;
pub mod merge;
pub mod persistence;
pub mod reconcile;
pub mod report;

pub use entity::{DEFAULT_BASE_TYPE, Entity, EntityCollection, Identifier, NamedCollection};
pub use error::{KgMergeError, Result};
pub use merge::{
    ConfidenceConfig, ConflictResolver, MergeConfig, MergeOutcome, MergeStatistics, Merger,
    Strategy, TypePriority,
};
pub use reconcile::{IdentifierConflict, merge_identifiers, reconcile_types};
pub use report::{Issue, IssueKind, QualityReport};
