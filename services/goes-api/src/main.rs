//! The thin axum front door: wires configuration, the query store, an
//! anonymous S3 client, and the routes in [`routes`], then serves forever.

mod error;
mod routes;
mod state;

use std::sync::Arc;

use goes_catalog::Catalog;
use goes_engine::EngineConfig;
use goes_store::FileQueryStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    tracing::info!(?config, "loaded engine configuration");

    let store = FileQueryStore::new(config.db_path.clone())?;
    std::fs::create_dir_all(&config.download_path)?;
    std::fs::create_dir_all(&config.source_path)?;

    let s3_client = goes_remote::build_client(&config.remote).await;

    let state = AppState {
        catalog: Catalog,
        store: Arc::new(store),
        config: Arc::new(config),
        s3_client: Arc::new(s3_client),
    };

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port: u16 = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
