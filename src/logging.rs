use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing` subscriber, writing to stderr.
/// Log filters come from `RUST_LOG`, falling back to `default_filter`.
pub fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Logging setup complete.");
}
