use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::RecommendationEngine,
};

pub mod recommendations;

/// Name reported by the root endpoint
pub const SERVICE_NAME: &str = "FlickAI Backend";

/// Shared application state
pub struct AppState {
    pub engine: RecommendationEngine,
    /// Upper bound on a whole recommendation request
    pub recommendation_timeout: Duration,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, recommendation_timeout: Duration) -> Self {
        Self {
            engine,
            recommendation_timeout,
        }
    }
}

/// Creates the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommendations", post(recommendations::recommend))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": format!("Welcome to {}!", SERVICE_NAME) }))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
