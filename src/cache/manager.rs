//! Cache Manager Module
//!
//! Owns the lifecycle of the current generation on top of a [`CacheStorage`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheStorage, CachedResponse};
use crate::error::Result;
use crate::models::RequestKey;

// == Cache Manager ==
/// Handle to the current generation. Cheap to clone.
#[derive(Clone)]
pub struct CacheManager {
    storage: Arc<dyn CacheStorage>,
    current: String,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager whose current generation is `version`.
    pub fn new(storage: Arc<dyn CacheStorage>, version: impl Into<String>) -> Self {
        Self {
            storage,
            current: version.into(),
        }
    }

    /// Name of the current generation.
    pub fn current(&self) -> &str {
        &self.current
    }

    // == Open Current ==
    pub async fn open_current(&self) -> Result<()> {
        self.storage.open(&self.current).await
    }

    // == Lookup ==
    /// Looks up a key in the current generation.
    pub async fn lookup(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        self.storage.match_request(&self.current, key).await
    }

    // == Store ==
    /// Writes a snapshot into the current generation, replacing any previous one.
    pub async fn store(&self, key: RequestKey, response: CachedResponse) -> Result<()> {
        debug!(generation = %self.current, key = %key, status = %response.status, "storing response");
        self.storage.put(&self.current, key, response).await
    }

    // == Purge Stale ==
    /// Deletes every generation other than the current one.
    ///
    /// Failing to enumerate generations is an error. A failure to delete one
    /// generation is logged and the rest are still attempted. Returns the names
    /// that were deleted.
    pub async fn purge_stale(&self) -> Result<Vec<String>> {
        let names = self.storage.keys().await?;
        let mut deleted = Vec::new();

        for name in names.into_iter().filter(|name| *name != self.current) {
            match self.storage.delete(&name).await {
                Ok(true) => {
                    info!(generation = %name, "deleted stale cache generation");
                    deleted.push(name);
                }
                Ok(false) => {}
                Err(e) => warn!(generation = %name, error = %e, "failed to delete stale generation"),
            }
        }

        Ok(deleted)
    }

    // == Entry Count ==
    pub async fn entry_count(&self) -> Result<usize> {
        self.storage.len(&self.current).await
    }
}
