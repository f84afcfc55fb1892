pub mod autocomplete_handler;
pub mod health_handler;
mod location_json;
pub mod user_handler;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{AddExtensionLayer, Router};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::set_global_default;
use tracing::{info, Subscriber};
use tracing_log::LogTracer;

use worldcities_core::locations_db::LocationsDb;

use crate::autocomplete_handler::{autocomplete_handler, autocomplete_schema_handler};
use crate::health_handler::health_handler;
use crate::user_handler::fetch_user_handler;

/// Register a subscriber as global default to process span data.
/// It should only be called once!
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

pub fn init_logging(log_level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_max_level(LevelFilter::from_level(log_level))
        .finish();
    init_subscriber(subscriber);
}

pub fn app(db: Arc<LocationsDb>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/locations/auto", get(autocomplete_handler))
        .route("/api/locations/auto/schema", get(autocomplete_schema_handler))
        .route("/api/users/fetch-user", get(fetch_user_handler))
        .layer(TraceLayer::new_for_http())
        .layer(AddExtensionLayer::new(db))
}

pub async fn serve(addr: SocketAddr, db: Arc<LocationsDb>) -> anyhow::Result<()> {
    info!("Running server on {addr}");
    axum::Server::bind(&addr)
        .serve(app(db).into_make_service())
        .await?;
    Ok(())
}
