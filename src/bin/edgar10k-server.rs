use anyhow::Context;
use edgar10k::logging::setup_logging;
use edgar10k::{CompanyDirectory, Edgar, EdgarConfig, StaticDirectory, TenKLookup, TickerDirectory};
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 3000;

fn port_from_env() -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("PORT must be a port number, got '{raw}'")),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

fn full_directory_requested() -> bool {
    std::env::var("EDGAR_FULL_DIRECTORY")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logging("info,tower_http=info");

    let config = EdgarConfig::from_env().context("invalid EDGAR_* configuration")?;
    let port = port_from_env()?;
    tracing::info!(
        "Registry client: user agent '{}', timeout {:?}, {} retries",
        config.user_agent,
        config.timeout,
        config.max_retries
    );

    let edgar = Edgar::with_config(config).context("failed to create Edgar client")?;

    let directory: Box<dyn CompanyDirectory> = if full_directory_requested() {
        Box::new(
            TickerDirectory::fetch(&edgar)
                .await
                .context("failed to load the registry ticker file")?,
        )
    } else {
        Box::new(StaticDirectory::new())
    };

    let app = edgar10k::server::router(Arc::new(TenKLookup::new(edgar, directory)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("SEC 10-K server running on port {}", port);
    tracing::info!("API available at http://localhost:{}/api", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
