//! Tracing setup for the CLI.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Send library logs to stderr so stdout stays for command output.
///
/// `RUST_LOG` overrides the default level, which is `debug` with
/// `--verbose` and `warn` otherwise.
pub fn configure_logging(verbose: bool) {
    let default_level = if verbose { "kgmerge=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
