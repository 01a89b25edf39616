//! posts-proxy
//!
//! Relays a small `/posts` REST surface to a fixed upstream JSON API.
//!
//! ```text
//!     Client ──▶ axum router ──▶ posts handler ──▶ UpstreamClient ──▶ Upstream API
//!     Client ◀── forced JSON ◀── relay / 500  ◀── buffered body  ◀──┘
//! ```

use std::path::PathBuf;

use posts_proxy::config::loader::{self, env};
use posts_proxy::config::ObservabilityConfig;
use posts_proxy::http::HttpServer;
use posts_proxy::lifecycle::{signals, Shutdown};
use posts_proxy::observability::logging;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The env file has to be applied before anything reads the environment.
    let dotenv_path = PathBuf::from(std::env::var(env::DOTENV_PATH).unwrap_or_else(|_| ".env".into()));
    let dotenv = loader::load_dotenv(&dotenv_path);
    let config = loader::from_env();

    let observability = config
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    logging::init_logging(&observability);

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded env file"),
        Ok(None) => tracing::debug!(path = %dotenv_path.display(), "No env file, continuing"),
        Err(e) => {
            tracing::error!(error = %e, "Env file could not be loaded");
            return Err(e.into());
        }
    }

    let config = config.inspect_err(|e| tracing::error!(error = %e, "Invalid configuration"))?;

    tracing::info!(
        bind_address = %config.bind_address(),
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.upstream.timeout_secs,
        propagate_status = config.upstream.propagate_status,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Starting up on http://localhost:{}", config.listener.port);

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
