pub mod auth;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::manager::DatabaseManager;

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(handlers::auth::router())
        .merge(handlers::location::router())
        // Protected (each router layers its own auth middleware)
        .merge(handlers::profile::router())
        .merge(handlers::rental_post::router())
        .merge(handlers::contract::router())
        .merge(handlers::recommendation::router())
        .merge(handlers::admin::router())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "API is running" }))
}

async fn health() -> impl IntoResponse {
    match DatabaseManager::health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": err.to_string() })),
        ),
    }
}
