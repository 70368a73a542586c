use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::ConsoleConfig;
use crate::console::{ConsoleError, ConsoleManager};
use crate::store::{MatchStore, StoreError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MatchStore>,
    pub consoles: Arc<ConsoleManager>,
    pub config: Arc<ConsoleConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn MatchStore>, config: ConsoleConfig) -> Self {
        let consoles = ConsoleManager::new(store.clone(), config.role, config.console_settings());
        Self {
            store,
            consoles: Arc::new(consoles),
            config: Arc::new(config),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A write was rejected and reverted; the client may try again
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(msg) => AppError::Unavailable(msg),
            StoreError::Database(msg) | StoreError::Malformed(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<ConsoleError> for AppError {
    fn from(error: ConsoleError) -> Self {
        match error {
            ConsoleError::NotPermitted(_) => AppError::Forbidden(error.to_string()),
            ConsoleError::UnknownMatch(_) | ConsoleError::UnknownEvent(_) => {
                AppError::NotFound(error.to_string())
            }
            ConsoleError::UnknownPlayer(_) => AppError::BadRequest(error.to_string()),
            ConsoleError::PersistFailed(_) | ConsoleError::ScoreSyncFailed(_) => {
                AppError::Unavailable(error.to_string())
            }
            ConsoleError::Store(store_error) => store_error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", msg),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
