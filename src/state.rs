/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::{DelegatedAuthorizer, TokenCodec};
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub token_codec: TokenCodec,
    pub sessions: SessionStore,
    pub delegated: Arc<dyn DelegatedAuthorizer>,
    pub delegated_cookie_name: String,
    pub external_login_url: String,
}

impl AppState {
    pub fn new(
        token_codec: TokenCodec,
        sessions: SessionStore,
        delegated: Arc<dyn DelegatedAuthorizer>,
        delegated_cookie_name: String,
        external_login_url: String,
    ) -> Self {
        Self {
            token_codec,
            sessions,
            delegated,
            delegated_cookie_name,
            external_login_url,
        }
    }
}
