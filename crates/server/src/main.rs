use std::sync::Arc;

use anyhow::Context;
use quizdesk_server::{
    api::{AppState, create_router},
    config::ServerConfig,
    db::init_pool_and_migrate,
    storage::LocalImageStore,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting quizdesk server");
    let config = ServerConfig::load().context("failed to load server config")?;

    let database_url = config.database_url()?;
    let db = init_pool_and_migrate(database_url)
        .await
        .context("failed to connect to the database")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.upload_dir.display()))?;
    let images = Arc::new(LocalImageStore::new(
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));

    let state = Arc::new(AppState::new(db, images, config.dev_identity.clone()));
    if let Some(identity) = &config.dev_identity {
        warn!(
            user_id = %identity.user_id,
            role = ?identity.role,
            "development identity is active, every request acts as this profile"
        );
        state
            .ensure_dev_profile()
            .await
            .context("failed to prepare development profile")?;
    }

    let uploads_route = config.uploads_route()?;
    let app = create_router(
        state,
        &config.upload_dir,
        &uploads_route,
        config.max_upload_bytes,
    );
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, stopping server"),
        Err(err) => warn!(error = %err, "failed to listen for shutdown signal"),
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
