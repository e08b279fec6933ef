//! Validate command - quality checks on a merged file.

use std::path::PathBuf;

use colored::Colorize;
use kgmerge::QualityReport;
use kgmerge::persistence::{load_merged_document, report_path, save_json};

use super::{require_file, resolve_optional_path};

const SHOWN_ISSUES: usize = 10;
const SHOWN_DUPLICATES: usize = 5;

pub fn run(
    file: PathBuf,
    base_type: String,
    json_output: bool,
    report: Option<Option<PathBuf>>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;

    let document = load_merged_document(&file)?;
    let quality = QualityReport::inspect_document(&document, &base_type);

    if let Some(explicit) = report {
        let path = resolve_optional_path(explicit, || report_path(&file));
        save_json(&path, &quality)?;
        if !json_output {
            println!(
                "{} {}",
                "Report saved to".green().bold(),
                path.display().to_string().white()
            );
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&quality)?);
    } else {
        print_report(&quality, verbose);
    }

    if !quality.is_clean() {
        return Err(format!(
            "{} validation issues found",
            quality.validation_issues.len()
        )
        .into());
    }

    Ok(())
}

fn print_report(quality: &QualityReport, verbose: bool) {
    println!("{}", "Quality report".cyan().bold());
    println!(
        "  Total entities:          {}",
        quality.total_entities.to_string().white().bold()
    );

    let issue_count = quality.validation_issues.len();
    let issues = if issue_count == 0 {
        issue_count.to_string().green()
    } else {
        issue_count.to_string().red()
    };
    println!("  Validation issues:       {}", issues);
    println!(
        "  Duplicate identifiers:   {}",
        quality.duplicate_issues.len().to_string().yellow()
    );

    let shown = if verbose { usize::MAX } else { SHOWN_ISSUES };
    if issue_count > 0 {
        println!();
        println!("{}", "Validation issues:".yellow().bold());
        for issue in quality.validation_issues.iter().take(shown) {
            println!("  - {}", issue.message);
        }
        if issue_count > shown {
            println!("  ... and {} more", issue_count - shown);
        }
    }

    let shown = if verbose { usize::MAX } else { SHOWN_DUPLICATES };
    if !quality.duplicate_issues.is_empty() {
        println!();
        println!("{}", "Duplicate identifier issues:".yellow().bold());
        for issue in quality.duplicate_issues.iter().take(shown) {
            println!("  - {}", issue.message);
        }
        if quality.duplicate_issues.len() > shown {
            println!("  ... and {} more", quality.duplicate_issues.len() - shown);
        }
    }

    println!();
    println!("{}", "Source overlap:".yellow().bold());
    println!(
        "  Single source entities:  {}",
        quality.source_analysis.single_source
    );
    println!(
        "  Multi-source entities:   {}",
        quality.source_analysis.multi_source
    );
    if verbose {
        for (combination, count) in &quality.source_analysis.source_combinations {
            println!("    {:30} {}", combination, count);
        }
    }

    println!();
    println!("{}", "Type distribution:".yellow().bold());
    let mut types: Vec<(&String, &usize)> = quality.type_analysis.type_counts.iter().collect();
    types.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (tag, count) in types.into_iter().take(SHOWN_ISSUES) {
        println!("  {:36} {}", tag, count);
    }
}
