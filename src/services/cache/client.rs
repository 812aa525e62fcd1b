//! Cache client interface used by higher-level services (session store, etc.).
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - We keep this independent from `AppError` so callers can decide how to fail
///   (fail-closed for sessions, fail-open for best-effort features).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal cache interface.
///
/// This is intentionally small and string-based:
/// - The session store only needs `GET`/`SET`/`DEL` on string values.
/// - Other features can add methods later, but keep the surface area small.
///
/// Object-safe on purpose: callers hold `Arc<dyn CacheClient>` so tests can
/// substitute the in-memory backend.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    // Returns the cache backend name (for logging/metrics).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value unconditionally, with no expiration.
    async fn set_string(&self, key: &str, value: &str) -> CacheResult<()>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
