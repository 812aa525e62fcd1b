//! In-memory cache backend.
//!
//! Used by the test suites and by local development without a Valkey
//! instance. Same contract as [`ValkeyClient`]: plain string keys, no
//! expiration.
//!
//! [`ValkeyClient`]: crate::services::cache::ValkeyClient

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::services::cache::client::{CacheClient, CacheResult};

#[derive(Debug, Default)]
pub struct MemoryClient {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheClient for MemoryClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        let removed = self.entries.lock().unwrap().remove(key).is_some();
        Ok(removed as u64)
    }
}
