//! ArticleBite HTTP server.
//!
//! Serves the deck generation API. Configuration comes from the environment:
//!
//! - `BIND_ADDR`: listen address, default `0.0.0.0:3000`
//! - `DATABASE_URL`: postgres URL; omitted means the in-memory store
//! - `ARTICLEBITE_API_KEY`: completion service key
//! - `ARTICLEBITE_MODEL`, `ARTICLEBITE_BASE_URL`: completion overrides
//! - `RUST_LOG`: tracing filter, default `info`

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use articlebite_core::{NotecardPipeline, PipelineConfig};

use crate::state::AppState;
use crate::store::{DeckStore, MemoryDeckStore, PostgresDeckStore};

mod api;
mod error;
mod state;
mod store;

/// Upper bound on one request, covering acquisition, summarization, and the
/// generation retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut builder = PipelineConfig::builder()
        .api_key(env::var("ARTICLEBITE_API_KEY").unwrap_or_default());
    if let Ok(model) = env::var("ARTICLEBITE_MODEL") {
        builder = builder.model(model);
    }
    if let Ok(base_url) = env::var("ARTICLEBITE_BASE_URL") {
        builder = builder.base_url(base_url);
    }
    let pipeline = Arc::new(NotecardPipeline::new(builder.build())?);

    let store: Arc<dyn DeckStore> = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = store::connect_pool(&database_url)?;
            let postgres = PostgresDeckStore::new(pool);
            postgres.ensure_schema().await?;
            info!("using the postgres deck store");
            Arc::new(postgres)
        }
        Err(_) => {
            info!("DATABASE_URL not set, decks are stored in memory");
            Arc::new(MemoryDeckStore::new())
        }
    };

    let app = api::router(AppState::new(pipeline, store)).layer(
        ServiceBuilder::new()
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
    );

    let addr: SocketAddr =
        env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "articlebite server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
