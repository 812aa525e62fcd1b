//! Cookie-backed session store.
//!
//! Binds a random session id (carried in a cookie) to an opaque string value
//! in the shared key-value store. The gateway never interprets the value; in
//! practice it is a signed bearer token that the cookie-injection filter
//! replays into the `Authorization` header.
//!
//! Preserved behavior worth knowing:
//! - Stored records have no expiration. Sessions live until `delete`.
//! - `update` performs no existence check; updating an unknown id silently
//!   creates the association.
//! - `delete` removes the stored record but does not clear the client cookie.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use thiserror::Error;
use uuid::Uuid;

use crate::services::cache::{CacheClient, CacheError};

const KEY_PREFIX: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    // The request carries no session cookie at all.
    #[error("no session cookie on request")]
    NoSession,
    #[error(transparent)]
    Store(#[from] CacheError),
}

/// Cookie attributes for the app-level session cookie.
///
/// `SameSite=None` is deliberate: the cookie is consumed by embedding
/// applications on other origins, which also forces `Secure` in browsers.
#[derive(Clone, Debug)]
pub struct SessionCookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: "app_session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
        }
    }
}

/// A found session: the id from the cookie plus the stored value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    pub value: String,
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn CacheClient>,
    cookie: SessionCookieConfig,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn CacheClient>, cookie: SessionCookieConfig) -> Self {
        Self { backend, cookie }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    /// Create a fresh session binding `id -> value` and build the cookie that
    /// carries the id. Ids come from a collision-resistant random source and
    /// are never reused across two `create` calls.
    pub async fn create(&self, value: &str) -> Result<(String, Cookie<'static>), SessionError> {
        let id = Uuid::new_v4().to_string();
        self.backend.set_string(&storage_key(&id), value).await?;
        Ok((id.clone(), self.build_cookie(id)))
    }

    /// Read the session for a request. An absent cookie is `Ok(None)` ("no
    /// session"), distinguishable from a store failure.
    pub async fn get(&self, headers: &HeaderMap) -> Result<Option<SessionRecord>, SessionError> {
        let Some(id) = self.session_id(headers) else {
            return Ok(None);
        };

        let value = self.backend.get_string(&storage_key(&id)).await?;
        Ok(value.map(|value| SessionRecord { id, value }))
    }

    /// Overwrite the stored value for the request's session id.
    ///
    /// No existence check: an id that was never created (or was deleted) gets
    /// a new association.
    pub async fn update(&self, headers: &HeaderMap, value: &str) -> Result<(), SessionError> {
        let id = self.session_id(headers).ok_or(SessionError::NoSession)?;
        self.backend.set_string(&storage_key(&id), value).await?;
        Ok(())
    }

    /// Remove the stored association for the request's session id.
    pub async fn delete(&self, headers: &HeaderMap) -> Result<(), SessionError> {
        let id = self.session_id(headers).ok_or(SessionError::NoSession)?;
        self.backend.del(&storage_key(&id)).await?;
        Ok(())
    }

    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.cookie.name)
            .map(|c| c.value().to_string())
    }

    fn build_cookie(&self, id: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.cookie.name.clone(), id))
            .path(self.cookie.path.clone())
            .secure(self.cookie.secure)
            .http_only(self.cookie.http_only)
            .same_site(SameSite::None)
            .build();

        if let Some(domain) = &self.cookie.domain {
            cookie.set_domain(domain.clone());
        }

        cookie
    }
}

fn storage_key(id: &str) -> String {
    format!("{KEY_PREFIX}:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryClient;
    use axum::http::header::COOKIE;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryClient::new()), SessionCookieConfig::default())
    }

    fn headers_with_cookie(name: &str, id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("{name}={id}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn create_then_get_returns_the_value() {
        let store = store();
        let (id, cookie) = store.create("opaque-token").await.unwrap();
        assert_eq!(cookie.value(), id);
        assert_eq!(cookie.name(), "app_session");

        let headers = headers_with_cookie(store.cookie_name(), &id);
        let record = store.get(&headers).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.value, "opaque-token");
    }

    #[tokio::test]
    async fn cookie_carries_configured_attributes() {
        let backend = Arc::new(MemoryClient::new());
        let store = SessionStore::new(
            backend,
            SessionCookieConfig {
                name: "sid".into(),
                path: "/shop".into(),
                domain: Some("example.com".into()),
                secure: true,
                http_only: true,
            },
        );

        let (_, cookie) = store.create("v").await.unwrap();
        assert_eq!(cookie.path(), Some("/shop"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[tokio::test]
    async fn absent_cookie_is_no_session_not_an_error() {
        let store = store();
        let record = store.get(&HeaderMap::new()).await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn delete_then_get_returns_no_session() {
        let store = store();
        let (id, _) = store.create("v").await.unwrap();
        let headers = headers_with_cookie(store.cookie_name(), &id);

        store.delete(&headers).await.unwrap();
        assert!(store.get(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_in_place() {
        let store = store();
        let (id, _) = store.create("old").await.unwrap();
        let headers = headers_with_cookie(store.cookie_name(), &id);

        store.update(&headers, "new").await.unwrap();
        let record = store.get(&headers).await.unwrap().unwrap();
        assert_eq!(record.value, "new");
    }

    #[tokio::test]
    async fn update_without_cookie_is_an_error() {
        let store = store();
        let err = store.update(&HeaderMap::new(), "v").await.unwrap_err();
        assert!(matches!(err, SessionError::NoSession));
    }

    #[tokio::test]
    async fn update_on_unknown_id_silently_creates() {
        let store = store();
        let headers = headers_with_cookie(store.cookie_name(), "never-created");

        store.update(&headers, "v").await.unwrap();
        let record = store.get(&headers).await.unwrap().unwrap();
        assert_eq!(record.value, "v");
    }

    #[tokio::test]
    async fn ids_are_unique_across_creates() {
        let store = store();
        let (a, _) = store.create("v").await.unwrap();
        let (b, _) = store.create("v").await.unwrap();
        assert_ne!(a, b);
    }
}
