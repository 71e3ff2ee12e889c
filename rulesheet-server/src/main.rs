//! rulesheet-server: receives sales rule events and synchronizes them into
//! the promotions workbooks.

mod api;
mod config;
mod error;
mod state;

use config::{BoxError, Config};
use state::AppState;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulesheet_server=info,rulesheet_sync=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Cancels background whole-file retries on exit
    let shutdown = CancellationToken::new();
    let state = AppState::from_config(&config, shutdown.clone())?;
    let app = api::router(state, config.handler_timeout());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("rulesheet-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
