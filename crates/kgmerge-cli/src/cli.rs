//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use kgmerge::{DEFAULT_BASE_TYPE, Strategy};
use std::path::PathBuf;

/// kgmerge: merge normalized knowledge-graph node sets
#[derive(Parser)]
#[command(name = "kgmerge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge normalized source files into one entity set
    Merge {
        /// Named input as NAME=PATH; repeat for each source, in fold order
        #[arg(
            short,
            long = "input",
            value_name = "NAME=PATH",
            required = true,
            value_parser = parse_input
        )]
        inputs: Vec<(String, PathBuf)>,

        /// Output path for the merged collection
        #[arg(short, long)]
        output: PathBuf,

        /// Merge strategy (union, intersection, confidence, type)
        #[arg(short, long, default_value = "union")]
        strategy: Strategy,

        /// Source weight for the confidence strategy as NAME=WEIGHT
        #[arg(short, long = "weight", value_name = "NAME=WEIGHT", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,

        /// Minimum number of sources an entity needs under intersection
        #[arg(long)]
        min_sources: Option<usize>,

        /// Type every type path must end with
        #[arg(long, default_value = DEFAULT_BASE_TYPE)]
        base_type: String,

        /// Save statistics (default path: <output>_stats.json)
        #[arg(long, value_name = "PATH")]
        stats: Option<Option<PathBuf>>,
    },

    /// Show statistics for a merged file
    Stats {
        /// Path to a merged collection
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run quality checks on a merged file
    Validate {
        /// Path to a merged collection
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Type every type path must end with
        #[arg(long, default_value = DEFAULT_BASE_TYPE)]
        base_type: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Save the full report (default path: <file>_validation_report.json)
        #[arg(long, value_name = "PATH")]
        report: Option<Option<PathBuf>>,
    },

    /// Export a merged file as a KGX-style node table
    Export {
        /// Path to a merged collection
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: <file>_nodes.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "tsv")]
        format: OutputFormat,
    },
}

/// Parse `NAME=PATH`.
fn parse_input(s: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = split_pair(s)?;
    Ok((name.to_string(), PathBuf::from(path)))
}

/// Parse `NAME=WEIGHT`. Range checks happen in the merge engine.
fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (name, weight) = split_pair(s)?;
    let weight: f64 = weight
        .parse()
        .map_err(|_| format!("Invalid weight '{}' for source '{}'", weight, name))?;
    Ok((name.to_string(), weight))
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
            Ok((name.trim(), value.trim()))
        }
        _ => Err(format!("Expected NAME=VALUE, got '{}'", s)),
    }
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
}

impl OutputFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            OutputFormat::Csv => b',',
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use tsv or csv.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_input() {
        let (name, path) = parse_input("PrimeKG=data/primekg.json").unwrap();
        assert_eq!(name, "PrimeKG");
        assert_eq!(path, PathBuf::from("data/primekg.json"));
        assert!(parse_input("data/primekg.json").is_err());
        assert!(parse_input("=x").is_err());
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("PrimeKG=0.6").unwrap(), ("PrimeKG".to_string(), 0.6));
        assert!(parse_weight("PrimeKG=high").is_err());
    }

    #[test]
    fn test_merge_args() {
        let cli = Cli::try_parse_from([
            "kgmerge",
            "merge",
            "-i",
            "A=a.json",
            "-i",
            "B=b.json",
            "-o",
            "out.json",
            "--strategy",
            "confidence",
            "--weight",
            "A=0.7",
            "--stats",
        ])
        .unwrap();

        match cli.command {
            Commands::Merge {
                inputs,
                strategy,
                weights,
                stats,
                ..
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(strategy, Strategy::Confidence);
                assert_eq!(weights, vec![("A".to_string(), 0.7)]);
                assert_eq!(stats, Some(None));
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_report_path_value() {
        let cli =
            Cli::try_parse_from(["kgmerge", "validate", "combined.json", "--report", "r.json"])
                .unwrap();
        match cli.command {
            Commands::Validate { report, .. } => {
                assert_eq!(report, Some(Some(PathBuf::from("r.json"))));
            }
            _ => panic!("expected validate command"),
        }
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = Cli::try_parse_from([
            "kgmerge", "merge", "-i", "A=a.json", "-o", "out.json", "-s", "majority",
        ]);
        assert!(result.is_err());
    }
}
