//! KGX-style node table export.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::entity::EntityCollection;
use crate::error::Result;
use crate::persistence::write_atomic;

/// Separator for multi-valued cells, as in KGX node files.
pub const LIST_SEPARATOR: &str = "|";

/// Column headers of the exported node table.
pub const NODE_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "category",
    "equivalent_identifiers",
    "source_databases",
    "confidence_score",
];

/// Write one row per entity to `writer`, delimited by `delimiter`.
///
/// Returns the number of rows written, excluding the header.
pub fn export_nodes<W: Write>(
    collection: &EntityCollection,
    writer: W,
    delimiter: u8,
) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(NODE_COLUMNS)?;

    let mut rows = 0;
    for entity in collection.entities() {
        let categories = entity.types.join(LIST_SEPARATOR);
        let equivalents = entity
            .equivalent_identifiers
            .iter()
            .map(|eq| eq.identifier.as_str())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        let sources = entity.source_databases.join(LIST_SEPARATOR);
        let confidence = entity
            .confidence_score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_default();

        csv_writer.write_record([
            entity.identifier(),
            entity.label(),
            categories.as_str(),
            equivalents.as_str(),
            sources.as_str(),
            confidence.as_str(),
        ])?;
        rows += 1;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(rows)
}

/// Export `collection` to a file, replacing it only once every row is written.
pub fn save_nodes(
    path: impl AsRef<Path>,
    collection: &EntityCollection,
    delimiter: u8,
) -> Result<usize> {
    let path = path.as_ref();
    let rows = write_atomic(path, |writer| export_nodes(collection, writer, delimiter))?;
    info!(rows, path = %path.display(), "exported node table");
    Ok(rows)
}
