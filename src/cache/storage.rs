//! Cache Storage Module
//!
//! The storage seam behind the cache manager, plus the in-process implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CachedResponse, Generation};
use crate::error::Result;
use crate::models::RequestKey;

// == Cache Storage Trait ==
/// Named generations of request/response pairs.
///
/// Individual key writes are atomic. There is no cross-key transaction.
#[async_trait]
pub trait CacheStorage: Send + Sync + 'static {
    /// Creates the generation if it does not exist yet.
    async fn open(&self, name: &str) -> Result<()>;

    /// Names of every existing generation.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Deletes a whole generation. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Looks up a key. A missing generation is a miss, not an error.
    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>>;

    /// Stores a snapshot, creating the generation if needed.
    async fn put(&self, name: &str, key: RequestKey, response: CachedResponse) -> Result<()>;

    /// Number of entries in a generation (0 if missing).
    async fn len(&self, name: &str) -> Result<usize>;
}

// == Memory Cache Storage ==
/// In-process generations behind a tokio RwLock.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    generations: RwLock<HashMap<String, Generation>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        let mut generations = self.generations.write().await;
        generations
            .entry(name.to_string())
            .or_insert_with(|| Generation::new(name));
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.generations.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.generations.write().await.remove(name).is_some())
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
        let generations = self.generations.read().await;
        Ok(generations
            .get(name)
            .and_then(|generation| generation.get(key))
            .cloned())
    }

    async fn put(&self, name: &str, key: RequestKey, response: CachedResponse) -> Result<()> {
        let mut generations = self.generations.write().await;
        generations
            .entry(name.to_string())
            .or_insert_with(|| Generation::new(name))
            .put(key, response);
        Ok(())
    }

    async fn len(&self, name: &str) -> Result<usize> {
        Ok(self
            .generations
            .read()
            .await
            .get(name)
            .map_or(0, Generation::len))
    }
}
