mod config;
mod error;
mod server;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting search-docs server");

    let config = Config::from_env()?;
    info!(
        docs_dir = %config.docs_dir.display(),
        listen_addr = %config.listen_addr,
        "configuration loaded"
    );
    if !config.docs_dir.is_dir() {
        warn!(docs_dir = %config.docs_dir.display(), "docs directory not found, serving an empty corpus");
    }

    let app = server::router(AppState::new(config.docs_dir.clone()));
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %config.listen_addr, "search-docs ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("search-docs shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
