use configs::AppConfig;
use service::{storage::JsonDocumentStore, KeyStrategy};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{routes, state::AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the backing document and build the shared state from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let keys: KeyStrategy = cfg.store.key_strategy.parse().map_err(anyhow::Error::msg)?;
    let store = JsonDocumentStore::new(&cfg.store.path).await?;
    info!(
        path = %store.path().display(),
        key_strategy = ?keys,
        require_national_id = cfg.users.require_national_id,
        "document store ready"
    );
    Ok(AppState::new(store, keys, cfg.users.require_national_id))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&cfg.server.static_dir, &cfg.store.path).await?;

    let state = build_state(&cfg).await?;
    let app = routes::build_router(state, build_cors(), Some(&cfg.server.static_dir));

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
