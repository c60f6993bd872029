//! The control-plane adapter (§6): translates HTTP requests into
//! `Store`/`Supervisor` operations. HTML rendering, form validation, and
//! request routing beyond this JSON surface are out of scope (§1).

pub mod api;
pub mod error;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use sentrywatch_core::config::ServerConfig;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/watches", get(api::list_watches).post(api::create_watch))
        .route(
            "/watches/{id}",
            get(api::watch_status).put(api::update_watch).delete(api::delete_watch),
        )
        .route("/watches/{id}/restart", post(api::restart_watch))
        .route("/watches/{id}/stop", post(api::stop_watch))
        .route("/watches/{id}/check_now", post(api::check_now))
        .route("/watches/{id}/status", get(api::watch_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Binds and serves the control plane until the process is killed.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("control plane listening on http://{addr}");
    axum::serve(listener, router(state)).await
}
