//! Stats command - summarize an already merged file.

use std::path::PathBuf;

use colored::Colorize;
use kgmerge::MergeStatistics;
use kgmerge::persistence::load_merged;

use super::merge::print_summary;
use super::require_file;

pub fn run(
    file: PathBuf,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let collection = load_merged(&file)?;
    let stats = MergeStatistics::compute(&collection)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{} {}",
            "Statistics for".cyan().bold(),
            file.display().to_string().white()
        );
        print_summary(&stats, verbose);
    }

    Ok(())
}
