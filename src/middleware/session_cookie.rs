//! Cookie injection filter.
//!
//! Pre-pass over every request: when no `Authorization` header is present,
//! look up the app session cookie and, if a stored value exists, synthesize
//! the `Authorization` header from it. Downstream logic (the access gate,
//! handlers) then has a single source of truth for the bearer token.

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::{self, Next};
use axum::response::Response;

use crate::state::AppState;

pub fn apply(router: Router, state: AppState) -> Router {
    router.layer(middleware::from_fn_with_state(state, inject_session_token))
}

async fn inject_session_token(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if req.headers().get(header::AUTHORIZATION).is_none() {
        match state.sessions.get(req.headers()).await {
            Ok(Some(record)) => match HeaderValue::from_str(&record.value) {
                Ok(value) => {
                    req.headers_mut().insert(header::AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!(
                        session_id = %record.id,
                        "stored session value is not a valid header value"
                    );
                }
            },
            Ok(None) => {}
            // A store failure degrades to "no session": the gate will deny
            // if the route requires login.
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed; continuing unauthenticated");
            }
        }
    }

    next.run(req).await
}
