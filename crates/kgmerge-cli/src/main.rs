//! kgmerge CLI - merge normalized knowledge-graph node sets.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::configure_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge {
            inputs,
            output,
            strategy,
            weights,
            min_sources,
            base_type,
            stats,
        } => commands::merge::run(
            commands::merge::MergeArgs {
                inputs,
                output,
                strategy,
                weights,
                min_sources,
                base_type,
                stats,
            },
            cli.verbose,
        ),

        Commands::Stats { file, json } => commands::stats::run(file, json, cli.verbose),

        Commands::Validate {
            file,
            base_type,
            json,
            report,
        } => commands::validate::run(file, base_type, json, report, cli.verbose),

        Commands::Export {
            file,
            output,
            format,
        } => commands::export::run(file, output, format, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
