use std::sync::Arc;

use anyhow::Context;
use server::config::AppConfig;
use server::state::AppState;
use server::{blacklist, database, seed};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    if let Some(admin) = &config.auth.bootstrap_admin {
        seed::ensure_admin_user(&db, admin)
            .await
            .context("Failed to create bootstrap admin")?;
    }

    let media = common::media::build_store(&config.media).context("Failed to set up media store")?;
    info!(backend = ?config.media.backend, cloud = %config.media.cloud_name, "Media store ready");

    tokio::spawn(blacklist::run_blacklist_purger(
        db.clone(),
        config.auth.blacklist_purge_interval_secs,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config: Arc::new(config),
        media,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
