use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Only client errors echo their message; everything else is logged here
        // and answered with a generic body.
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::HttpClient(_) | AppError::Embedding(_) => {
                tracing::error!(error = %self, "Upstream dependency failed");
                (StatusCode::BAD_GATEWAY, "Upstream service error".to_string())
            }
            AppError::Timeout(_) => {
                tracing::warn!(error = %self, "Request timed out");
                (StatusCode::GATEWAY_TIMEOUT, "Request timed out".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
