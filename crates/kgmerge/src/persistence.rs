//! Reading source collections and writing merge artifacts as JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::entity::{EntityCollection, NamedCollection};
use crate::error::{KgMergeError, Result};

/// Load and validate one normalized source file.
///
/// # Example
///
/// ```no_run
/// # use kgmerge::persistence::load_collection;
/// let primekg =
///     load_collection("PrimeKG", "primekg_normalized.json", "biolink:NamedThing").unwrap();
/// println!("{} entities", primekg.len());
/// ```
pub fn load_collection(
    name: &str,
    path: impl AsRef<Path>,
    base_type: &str,
) -> Result<NamedCollection> {
    let path = path.as_ref();
    let raw: IndexMap<String, Value> = read_json(path)?;
    let entities = EntityCollection::from_raw(name, raw, base_type)?;

    info!(source = name, entities = entities.len(), path = %path.display(), "loaded collection");
    Ok(NamedCollection::new(name, entities))
}

/// Load a merged collection without re-checking the type-list invariant.
pub fn load_merged(path: impl AsRef<Path>) -> Result<EntityCollection> {
    let path = path.as_ref();
    let collection: EntityCollection = read_json(path)?;
    info!(entities = collection.len(), path = %path.display(), "loaded merged collection");
    Ok(collection)
}

/// Load a merged file as raw records, so records with missing or malformed
/// fields can still be reported on one by one.
pub fn load_merged_document(path: impl AsRef<Path>) -> Result<IndexMap<String, Value>> {
    let path = path.as_ref();
    let document: IndexMap<String, Value> = read_json(path)?;
    info!(records = document.len(), path = %path.display(), "loaded merged document");
    Ok(document)
}

/// Save a collection as pretty JSON.
pub fn save_collection(path: impl AsRef<Path>, collection: &EntityCollection) -> Result<()> {
    let path = path.as_ref();
    write_json_atomic(path, collection)?;
    info!(entities = collection.len(), path = %path.display(), "saved collection");
    Ok(())
}

/// Save any serializable artifact (statistics, reports) as pretty JSON.
pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    write_json_atomic(path.as_ref(), value)
}

/// Default statistics path for an output file: `<stem>_stats.json` beside it.
///
/// ```
/// use kgmerge::persistence::stats_path;
///
/// let path = stats_path("out/combined.json");
/// assert_eq!(path.to_string_lossy(), "out/combined_stats.json");
/// ```
pub fn stats_path(output: impl AsRef<Path>) -> PathBuf {
    sibling_with_suffix(output.as_ref(), "_stats.json")
}

/// Default quality report path: `<stem>_validation_report.json` beside it.
pub fn report_path(data: impl AsRef<Path>) -> PathBuf {
    sibling_with_suffix(data.as_ref(), "_validation_report.json")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = path.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}{}", stem, suffix))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| KgMergeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        KgMergeError::Persistence(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |writer| Ok(serde_json::to_writer_pretty(writer, value)?))
}

/// Write to a temp file beside `path`, then rename into place.
///
/// The temp file is removed when `write` or the rename fails, so `path` is
/// either untouched or complete.
pub(crate) fn write_atomic<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T>,
) -> Result<T> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                KgMergeError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| -> Result<T> {
        let file = File::create(&tmp_path).map_err(|e| KgMergeError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        let value = write(&mut writer)?;
        writer.flush().map_err(|e| KgMergeError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, path).map_err(|e| KgMergeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(value)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
