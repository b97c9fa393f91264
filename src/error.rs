/*
 * Responsibility
 * - App-wide ApiError definition
 * - IntoResponse impl (HTTP status / JSON error body)
 * - Conversion from auth/repo layer errors into one HTTP-facing shape
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::error::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized { code, message } => (StatusCode::UNAUTHORIZED, code, message),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found"),
            ),
            AppError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        let code = match &e {
            AuthError::MissingHeader { .. } => "MISSING_AUTH_HEADER",
            AuthError::MalformedHeader { .. } => "INVALID_AUTH_HEADER",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenInvalid(_) => "TOKEN_INVALID",
            AuthError::NoActiveSession => "ACCESS_DENIED",
            AuthError::SessionSuperseded => "INVALID_SESSION",
            AuthError::Store(_) => "UNAUTHORIZED",
        };

        // Keep parser/backend detail out of the response body.
        let message = match &e {
            AuthError::TokenInvalid(_) => "invalid token".to_string(),
            AuthError::Store(_) => "unauthorized".to_string(),
            other => other.to_string(),
        };

        AppError::Unauthorized { code, message }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("CONFLICT", "resource conflict"),
            RepoError::Db(_) => AppError::Internal,
        }
    }
}
