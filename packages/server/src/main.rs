use anyhow::Context;
use tracing::{info, warn};

use recipe_server::config::AppConfig;
use recipe_server::state::{AppState, build_object_store};
use recipe_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    if config.upload.create_max_bytes != config.upload.replace_max_bytes {
        warn!(
            create_max_bytes = config.upload.create_max_bytes,
            replace_max_bytes = config.upload.replace_max_bytes,
            "Upload ceilings differ between recipe creation and image replacement"
        );
    }

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::seed_categories(&db)
        .await
        .context("Failed to seed categories")?;

    let store = build_object_store(&config.storage).context("Failed to build object store")?;
    info!(
        backend = ?config.storage.backend,
        bucket = %config.storage.bucket,
        "Object store ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState {
        db,
        store,
        config,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
