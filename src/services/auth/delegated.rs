//! Delegated authorization: the external service that makes the final
//! allow/deny decision for sudo routes, keyed by its own cookie.

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DelegatedError {
    // The service answered and said no. Status/message surface to the client.
    #[error("delegated authorization denied: {message}")]
    Denied { status: StatusCode, message: String },
    // The service could not be reached (or timed out). Never treated as
    // success; surfaces as an internal denial.
    #[error("delegated authorization transport failure: {0}")]
    Transport(String),
}

/// One check per sudo-route request, no caching. Implementations must bound
/// their own timeout so a slow authorizer cannot hold requests indefinitely.
#[async_trait]
pub trait DelegatedAuthorizer: Send + Sync + 'static {
    async fn check(
        &self,
        method: &Method,
        host: &str,
        uri: &str,
        cookie_value: &str,
    ) -> Result<(), DelegatedError>;
}

/// HTTP client for the delegated authorization service.
///
/// The original request's method/host/uri travel as forwarding headers, the
/// delegated cookie as a `session` cookie, mirroring what the service expects.
pub struct HttpDelegatedAuthorizer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDelegatedAuthorizer {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, DelegatedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DelegatedError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl DelegatedAuthorizer for HttpDelegatedAuthorizer {
    async fn check(
        &self,
        method: &Method,
        host: &str,
        uri: &str,
        cookie_value: &str,
    ) -> Result<(), DelegatedError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Forwarded-Method", method.as_str())
            .header("X-Forwarded-Host", host)
            .header("X-Forwarded-Uri", uri)
            .header(reqwest::header::COOKIE, format!("session={cookie_value}"))
            .send()
            .await
            .map_err(|e| DelegatedError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .await
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "permission denied".to_string());

        Err(DelegatedError::Denied {
            status: StatusCode::from_u16(status.as_u16())
                .unwrap_or(StatusCode::FORBIDDEN),
            message,
        })
    }
}
