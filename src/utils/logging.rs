// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable.
/// Defaults to "info" if `RUST_LOG` is not set; `--debug` raises the
/// crate's own level to "debug" so section boundary decisions show up.
pub fn setup_logging(debug: bool) {
    let default_filter = if debug {
        "info,statement_extractor=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the JSON output
        .init();

    tracing::debug!("Logging setup complete.");
}
