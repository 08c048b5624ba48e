use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use babylog_backend::backend::{create_router, initialize_backend};
use babylog_backend::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging; `log` records from the library are bridged in
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Using data directory {}", config.data_dir.display());
    let app_state = initialize_backend(&config)?;
    let app = create_router(app_state, &config.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
