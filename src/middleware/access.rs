//! Authorization gate middleware.
//!
//! Wires the decision table in `services::auth::gate` into the router: the
//! verdict is computed once, fully, before the wrapped handler; a deny renders
//! the error envelope and the handler never runs.
//!
//! Existing clients send the bearer token directly in the `Authorization`
//! header (no `Bearer ` scheme prefix).

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::api::context::{REQUEST_ID_HEADER, error_response};
use crate::error::{ErrorEntry, denial_kind};
use crate::services::auth::{RequestLine, RoutePolicy, Verdict, authorize};
use crate::state::AppState;

/// Guard every route in `router` with the given policy.
///
/// 例：
/// ```ignore
/// let admin = protect(admin_routes(), state.clone(), RoutePolicy::SUDO);
/// ```
pub fn protect(
    router: Router<AppState>,
    state: AppState,
    policy: RoutePolicy,
) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        (state, policy),
        access_middleware,
    ))
}

async fn access_middleware(
    State((state, policy)): State<(AppState, RoutePolicy)>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let delegated_cookie = CookieJar::from_headers(req.headers())
        .get(&state.delegated_cookie_name)
        .map(|c| c.value().to_string());

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let uri = req.uri().to_string();
    let method = req.method().clone();

    let (claim, verdict) = authorize(
        &state.token_codec,
        bearer.as_deref(),
        policy,
        delegated_cookie.as_deref(),
        RequestLine {
            method: &method,
            host: &host,
            uri: &uri,
        },
        state.delegated.as_ref(),
    )
    .await;

    match verdict {
        Verdict::Allow => {
            // Handlers read the identity from extensions; no re-derivation.
            if let Some(claim) = claim {
                req.extensions_mut().insert(claim);
            }
            next.run(req).await
        }
        Verdict::Deny { status, message } => {
            let request_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();

            tracing::warn!(
                request_id = %request_id,
                path = %req.uri().path(),
                status = %status,
                %message,
                "request denied by authorization gate"
            );

            error_response(
                request_id,
                status,
                vec![ErrorEntry {
                    message,
                    kind: denial_kind(status).to_string(),
                }],
            )
        }
    }
}
