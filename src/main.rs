use sell_in_tracker::{load_snapshot, router, AppState, ProgressiveEngine, Settings};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env()?;
    if let Some(parent) = settings.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut engine = ProgressiveEngine::default().with_cache_ttl(settings.cache_ttl);
    if let Err(err) = engine.import_state(load_snapshot(&settings.data_path).await) {
        error!("ignoring stored state: {err}");
    }
    info!(
        dates = engine.len(),
        first_date = ?engine.first_date(),
        "state loaded from {}",
        settings.data_path.display()
    );

    let app = router(AppState::new(settings.data_path, engine));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
