/*
 * Responsibility
 * - アプリ共通の AppError 定義 (error taxonomy)
 * - envelope 用の ErrorEntry への変換 (status / message / type)
 * - token / session / cache エラーを統一的に変換
 */
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::TokenError;
use crate::services::cache::CacheError;
use crate::services::session::SessionError;

/// One field-level validation failure from the validation collaborator.
/// The gateway relays these, it does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// One entry of the error envelope: `{"message": ..., "type": ...}`.
/// For validation failures `type` carries the machine-readable field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    // Always a list, even for a single failed field; independent validation
    // failures within one request are all reported.
    #[error("bad request")]
    BadRequest(Vec<FieldError>),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(errors: Vec<FieldError>) -> Self {
        Self::BadRequest(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        match self {
            AppError::BadRequest(errors) => errors
                .iter()
                .map(|e| ErrorEntry {
                    message: e.message.clone(),
                    kind: e.path.clone(),
                })
                .collect(),
            AppError::Unauthorized(message) => vec![ErrorEntry {
                message: message.clone(),
                kind: "unauthorized".to_string(),
            }],
            AppError::Forbidden(message) => vec![ErrorEntry {
                message: message.clone(),
                kind: "forbidden".to_string(),
            }],
            // Internal detail goes to logs, never to the client.
            AppError::Internal => vec![ErrorEntry {
                message: "internal server error".to_string(),
                kind: "internal".to_string(),
            }],
        }
    }
}

/// Entry kind for a denial that carries an arbitrary status (delegated
/// authorization propagates the external service's status verbatim).
pub fn denial_kind(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        s if s.is_client_error() => "permission_denied",
        _ => "internal",
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::Unauthorized(e.to_string()),
            TokenError::Sign => AppError::Internal,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NoSession => {
                AppError::Unauthorized("no session cookie on request".to_string())
            }
            SessionError::Store(err) => {
                tracing::error!(error = %err, "session store failure");
                AppError::Internal
            }
        }
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        tracing::error!(error = %e, "cache failure");
        AppError::Internal
    }
}
