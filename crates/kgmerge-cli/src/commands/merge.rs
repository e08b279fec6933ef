//! Merge command - combine normalized sources into one entity set.

use std::path::PathBuf;

use colored::Colorize;
use kgmerge::persistence::{load_collection, save_collection, save_json, stats_path};
use kgmerge::{MergeConfig, MergeStatistics, Merger, Strategy};
use tracing::debug;

use super::{require_file, resolve_optional_path};

pub struct MergeArgs {
    pub inputs: Vec<(String, PathBuf)>,
    pub output: PathBuf,
    pub strategy: Strategy,
    pub weights: Vec<(String, f64)>,
    pub min_sources: Option<usize>,
    pub base_type: String,
    pub stats: Option<Option<PathBuf>>,
}

pub fn run(args: MergeArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = MergeConfig::new(args.strategy).with_base_type(&args.base_type);
    for (source, weight) in &args.weights {
        config = config.with_weight(source, *weight);
    }
    if let Some(k) = args.min_sources {
        config = config.with_min_sources(k);
    }

    // Reject bad parameters before reading anything
    let names: Vec<&str> = args.inputs.iter().map(|(n, _)| n.as_str()).collect();
    config.validate(&names)?;
    debug!(strategy = %args.strategy, sources = names.len(), "merge parameters accepted");
    for (_, path) in &args.inputs {
        require_file(path)?;
    }

    println!(
        "{} {} sources with {} strategy",
        "Merging".cyan().bold(),
        args.inputs.len().to_string().white().bold(),
        args.strategy.to_string().white().bold()
    );

    let mut sources = Vec::with_capacity(args.inputs.len());
    for (name, path) in &args.inputs {
        let collection = load_collection(name, path, &args.base_type)?;
        println!(
            "  {:12} {:>8} entities  {}",
            name,
            collection.len(),
            path.display().to_string().dimmed()
        );
        sources.push(collection);
    }

    let outcome = Merger::with_config(config).merge(&sources)?;

    // Everything below runs only after a successful merge
    save_collection(&args.output, &outcome.collection)?;
    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        args.output.display().to_string().white()
    );

    if let Some(explicit) = args.stats {
        let path = resolve_optional_path(explicit, || stats_path(&args.output));
        save_json(&path, &outcome.statistics)?;
        println!(
            "{} {}",
            "Statistics saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    print_summary(&outcome.statistics, verbose);
    Ok(())
}

pub(crate) fn print_summary(stats: &MergeStatistics, verbose: bool) {
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!(
        "  Total entities:           {}",
        stats.total_entities.to_string().white().bold()
    );
    println!(
        "  Multi-source entities:    {}",
        stats.multi_source_entities.to_string().white()
    );
    println!(
        "  Avg identifiers/entity:   {:.2}",
        stats.average_equivalent_identifiers
    );
    println!("  Avg types/entity:         {:.2}", stats.average_types);
    if stats.identifier_conflicts > 0 {
        println!(
            "  Label conflicts:          {}",
            stats.identifier_conflicts.to_string().yellow()
        );
    }

    println!();
    println!("{}", "Entities by source:".yellow().bold());
    for (source, count) in &stats.entities_by_source {
        println!("  {:12} {}", source, count);
    }

    println!();
    println!("{}", "Source overlap:".yellow().bold());
    for (bucket, count) in &stats.source_overlap {
        println!("  {} source(s): {}", bucket, count);
    }

    let limit = if verbose { usize::MAX } else { 10 };
    println!();
    println!("{}", "Top entity types:".yellow().bold());
    for (name, count) in stats.top_types(limit) {
        println!("  {:30} {}", name, count);
    }

    if verbose && !stats.conflict_samples.is_empty() {
        println!();
        println!("{}", "Label conflicts (sample):".yellow().bold());
        for conflict in &stats.conflict_samples {
            println!(
                "  {} {}: kept '{}', dropped '{}'",
                conflict.entity_id,
                conflict.identifier.dimmed(),
                conflict.kept_label,
                conflict.discarded_label
            );
        }
    }
}
