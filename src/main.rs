use rewarding_life::{AppState, Config, HttpEndpoint, Reconciler, SessionStore, router};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let store = SessionStore::new(config.session_path.clone());
    let endpoint = HttpEndpoint::new(config.endpoint_url.clone());
    info!(endpoint = %endpoint.url(), session = %store.path().display(), "starting dashboard");

    let mut reconciler = Reconciler::new(endpoint, store, config.acting_user.clone());
    if let Err(err) = reconciler.restore().await {
        warn!(error = %err, view = reconciler.view().as_str(), "stored session not refreshed");
    }

    let app = router(AppState::new(config.icons_dir.clone(), reconciler));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
