//! Entity record model.
//!
//! An [`Entity`] is one normalized concept: a canonical CURIE, the
//! equivalent identifiers found for it, and a Biolink type path from the
//! most specific tag down to the base type.

mod collection;
mod record;

pub use collection::{EntityCollection, NamedCollection};
pub use record::{DEFAULT_BASE_TYPE, Entity, Identifier};
