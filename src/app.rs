/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (request-id/CORS/session cookie/access gate)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::middleware;
use crate::services::auth::{HttpDelegatedAuthorizer, TokenCodec};
use crate::services::cache::ValkeyClient;
use crate::services::session::SessionStore;
use crate::state::AppState;

use crate::api;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let token_codec = TokenCodec::new(
        &config.auth_token_secret,
        config.auth_token_ttl_seconds,
        config.auth_token_leeway_seconds,
    );

    let cache = ValkeyClient::new(&config.valkey_url)
        .await
        .context("failed to connect to Valkey")?;
    let sessions = SessionStore::new(Arc::new(cache), config.session_cookie.clone());

    let delegated = HttpDelegatedAuthorizer::new(
        config.delegated_auth_url.clone(),
        config.delegated_auth_timeout,
    )
    .context("failed to build delegated authorization client")?;

    let state = AppState::new(
        token_codec,
        sessions,
        Arc::new(delegated),
        config.delegated_cookie_name.clone(),
        config.external_login_url.clone(),
    );

    let app = middleware::http::apply(middleware::cors::apply(
        build_router(state),
        &config,
    ));

    tracing::info!(addr = %config.addr, "gateway listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Assemble the versioned API plus the gateway middleware that every request
/// passes through: cookie injection (outer) then the per-route access gate.
pub fn build_router(state: AppState) -> Router {
    let app = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state.clone());

    middleware::session_cookie::apply(app, state)
}
