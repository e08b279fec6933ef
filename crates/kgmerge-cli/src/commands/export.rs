//! Export command - write a merged file as a node table.

use std::path::PathBuf;

use colored::Colorize;
use kgmerge::export::save_nodes;
use kgmerge::persistence::load_merged;

use crate::cli::OutputFormat;

use super::require_file;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let collection = load_merged(&file)?;

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}_nodes.{}", stem, format))
    });

    let rows = save_nodes(&output_path, &collection, format.delimiter())?;

    println!(
        "{} {} nodes to {}",
        "Exported".green().bold(),
        rows.to_string().white().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
