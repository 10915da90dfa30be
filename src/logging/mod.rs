// Logging module for structured logging using the tracing crate

use std::error::Error;

/// Initialize the tracing subscriber for structured logging.
///
/// Log level defaults to `info` and can be overridden through `RUST_LOG`
/// (e.g. `RUST_LOG=sukashi=debug`). Output goes to stderr so exported file
/// paths printed by the CLI stay clean on stdout.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_subscriber() -> Result<(), Box<dyn Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;

    Ok(())
}
