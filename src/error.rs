use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures talking to the school portal.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("remote API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("CAS login failed")]
    LoginFailed,

    #[error("logged in but the remote user id is missing")]
    MissingUserId,

    #[error("failed to parse remote response: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("School portal error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("CAS password required for {cas_username}")]
    CasPasswordRequired { cas_username: String },

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_password: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas_username: Option<String>,
}

impl ErrorResponse {
    fn message(error: String) -> Self {
        Self {
            error,
            requires_password: None,
            cas_username: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::message("Not Found".to_string()),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorResponse::message(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::message(msg)),
            AppError::CasPasswordRequired { cas_username } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "CAS password is required to verify the bound account".to_string(),
                    requires_password: Some(true),
                    cas_username: Some(cas_username),
                },
            ),
            AppError::Scrape(ScrapeError::LoginFailed) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::message(ScrapeError::LoginFailed.to_string()),
            ),
            AppError::Scrape(e) => {
                error!("school portal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::message(e.to_string()))
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Database error occurred".to_string()),
                )
            }
            AppError::Migrate(e) => {
                error!("migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::message("Database error occurred".to_string()),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::message("Internal server error".to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}
