/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 各ルートに RoutePolicy を割り当てる (gate はここで掛ける)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::access::protect;
use crate::services::auth::RoutePolicy;
use crate::state::AppState;

use crate::api::v1::handlers::{
    admin::admin_overview,
    health::health,
    internal::refresh_cache,
    pages::render_page,
    profile::{get_profile, logout, update_profile},
    session::login_redirect,
};

pub fn routes(state: AppState) -> Router<AppState> {
    // Public routes still pass the gate: a presented-but-invalid token is
    // denied 401 even where no login is required, and a valid claim rides
    // along for personalization.
    let public = protect(
        Router::new()
            .route("/health", get(health))
            .route("/pages/{slug}", get(render_page))
            .route("/login", get(login_redirect)),
        state.clone(),
        RoutePolicy::PUBLIC,
    );

    let account = protect(
        Router::new()
            .route("/me", get(get_profile).put(update_profile))
            .route("/logout", post(logout)),
        state.clone(),
        RoutePolicy::LOGIN,
    );

    let admin = protect(
        Router::new().route("/admin/overview", get(admin_overview)),
        state.clone(),
        RoutePolicy::SUDO,
    );

    let internal = protect(
        Router::new().route("/internal/cache/refresh", post(refresh_cache)),
        state,
        RoutePolicy::INTERNAL,
    );

    public.merge(account).merge(admin).merge(internal)
}
