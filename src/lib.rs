pub mod api;
pub mod config;
pub mod intelligence;
pub mod models;
pub mod summary;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{start_server_on, ApiContext, ServerError};
use crate::config::{ConfigError, ServerConfig, SummaryConfig};
use crate::summary::{BackendError, SummaryOrchestrator};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Cannot build summary backend: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

pub fn run() -> Result<(), RunError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let summary_config = SummaryConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    tracing::info!(
        backends = summary_config.backends.len(),
        per_attempt = ?summary_config.per_attempt_timeout,
        overall = ?summary_config.overall_deadline,
        "Summary configuration loaded"
    );
    if summary_config.backends.is_empty() {
        tracing::warn!("No summary backends configured, summaries will use the local fallback");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let orchestrator = SummaryOrchestrator::from_config(summary_config)?;
        let ctx = ApiContext::new(orchestrator);

        let mut server = start_server_on(ctx, server_config.bind_addr).await?;
        tracing::info!(addr = %server.session.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        server.shutdown();
        // Let in-flight requests drain.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        Ok::<(), RunError>(())
    })
}
