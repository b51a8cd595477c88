//! Logging setup for the `nibuild` binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr subscriber so stdout carries only command output.
///
/// `RUST_LOG` selects the level and defaults to `warn`; `verbose` forces
/// `debug` for the nibuild crates.
pub fn init_tracing(verbose: bool) -> Result<(), String> {
    let filter = env_filter(verbose)?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing: {error}"))
}

fn env_filter(verbose: bool) -> Result<EnvFilter, String> {
    if verbose {
        return EnvFilter::try_new("warn,nibuild_compiler=debug,nibuild_cli=debug")
            .map_err(|error| format!("invalid log filter: {error}"));
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|error| format!("invalid log filter: {error}"))
}
