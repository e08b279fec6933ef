//! Field-level reconciliation of two versions of the same entity.

mod identifiers;
mod types;

pub use identifiers::{IdentifierConflict, IdentifierMerge, dedupe_identifiers, merge_identifiers};
pub use types::{reconcile_types, type_name};
