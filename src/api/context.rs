//! Per-request context and the response envelope.
//!
//! Handlers never touch the wire. They receive a `RequestContext` (resolved
//! claim + request id), call exactly one outcome setter, and return the
//! context; serialization into one of the fixed wire shapes happens here.
//!
//! Ordering contract: for every kind, response headers are set before the
//! status and before any body bytes. `Response::builder` is used in exactly
//! that order so the contract is visible in the code.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, ErrorEntry, FieldError};
use crate::services::auth::Claim;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// `{"success": true, "payload": ...}`
#[derive(Serialize)]
struct SuccessBody {
    success: bool,
    payload: Value,
}

/// `{"success": false, "error": [...], "request_id": ...}`
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: Vec<ErrorEntry>,
    request_id: String,
}

#[derive(Debug)]
enum Outcome {
    Unset,
    Json { status: StatusCode, payload: Value },
    Html(String),
    Redirect { status: StatusCode, url: String },
    Error { status: StatusCode, entries: Vec<ErrorEntry> },
}

/// Mutable per-request scratch state, built by the extractor, discarded after
/// the response is written.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub path: String,
    claim: Option<Claim>,
    outcome: Outcome,
}

impl RequestContext {
    /// The resolved identity, if the gate attached one.
    pub fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }

    /// Success payload, 200.
    pub fn payload(&mut self, payload: Value) {
        self.outcome = Outcome::Json {
            status: StatusCode::OK,
            payload,
        };
    }

    /// Success payload, 201.
    pub fn created(&mut self, payload: Value) {
        self.outcome = Outcome::Json {
            status: StatusCode::CREATED,
            payload,
        };
    }

    /// Raw HTML body, 200.
    pub fn html(&mut self, body: String) {
        self.outcome = Outcome::Html(body);
    }

    /// Temporary redirect (307), used for delegated external login flows.
    pub fn redirect(&mut self, url: impl Into<String>) {
        self.outcome = Outcome::Redirect {
            status: StatusCode::TEMPORARY_REDIRECT,
            url: url.into(),
        };
    }

    /// Permanent redirect (308).
    pub fn redirect_permanent(&mut self, url: impl Into<String>) {
        self.outcome = Outcome::Redirect {
            status: StatusCode::PERMANENT_REDIRECT,
            url: url.into(),
        };
    }

    /// One overall error.
    pub fn fail(&mut self, error: AppError) {
        self.outcome = Outcome::Error {
            status: error.status(),
            entries: error.entries(),
        };
    }

    /// Many field errors, reported together (never truncated to the first).
    pub fn fail_fields(&mut self, errors: Vec<FieldError>) {
        self.fail(AppError::bad_request(errors));
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            request_id,
            path: parts.uri.path().to_string(),
            claim: parts.extensions.get::<Claim>().cloned(),
            outcome: Outcome::Unset,
        })
    }
}

impl IntoResponse for RequestContext {
    fn into_response(self) -> Response {
        match self.outcome {
            Outcome::Json { status, payload } => {
                let body = SuccessBody {
                    success: true,
                    payload,
                };
                build(
                    &self.request_id,
                    "application/json",
                    status,
                    serde_json::to_vec(&body).unwrap_or_default(),
                )
            }
            Outcome::Html(html) => build(
                &self.request_id,
                "text/html; charset=utf-8",
                StatusCode::OK,
                html.into_bytes(),
            ),
            Outcome::Redirect { status, url } => redirect_response(&self.request_id, status, &url),
            Outcome::Error { status, entries } => {
                error_response(&self.request_id, status, entries)
            }
            Outcome::Unset => {
                // A handler returned without picking an outcome. Surface it
                // as an internal error rather than an empty 200.
                tracing::error!(path = %self.path, "handler set no response outcome");
                error_response(
                    &self.request_id,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AppError::Internal.entries(),
                )
            }
        }
    }
}

/// Render the error envelope. Shared by handler outcomes and gate denials so
/// every denial path produces the exact same wire shape.
pub fn error_response(request_id: &str, status: StatusCode, entries: Vec<ErrorEntry>) -> Response {
    let body = ErrorBody {
        success: false,
        error: entries,
        request_id: request_id.to_string(),
    };
    build(
        request_id,
        "application/json",
        status,
        serde_json::to_vec(&body).unwrap_or_default(),
    )
}

// Headers first, then status, then body.
fn build(request_id: &str, content_type: &'static str, status: StatusCode, body: Vec<u8>) -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(REQUEST_ID_HEADER, request_id)
        .status(status)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn redirect_response(request_id: &str, status: StatusCode, url: &str) -> Response {
    Response::builder()
        .header(header::LOCATION, url)
        .header(REQUEST_ID_HEADER, request_id)
        .status(status)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
