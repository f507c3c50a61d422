//! Storage whose operations can be switched to fail, for exercising the
//! failure paths of the cache manager and the controller.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cache::{CacheStorage, CachedResponse, MemoryCacheStorage};
use crate::error::{CacheError, Result};
use crate::models::RequestKey;

#[derive(Debug, Default)]
pub(crate) struct FaultyStorage {
    inner: MemoryCacheStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_keys: AtomicBool,
    undeletable: Mutex<HashSet<String>>,
}

fn unavailable(op: &str) -> CacheError {
    CacheError::Storage(format!("{}: disk unavailable", op))
}

impl FaultyStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_reads(&self) -> &Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn fail_writes(&self) -> &Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn fail_keys(&self) -> &Self {
        self.fail_keys.store(true, Ordering::SeqCst);
        self
    }

    /// Makes deleting generation `name` fail.
    pub(crate) fn fail_delete(&self, name: &str) -> &Self {
        self.undeletable.lock().unwrap().insert(name.to_string());
        self
    }
}

#[async_trait]
impl CacheStorage for FaultyStorage {
    async fn open(&self, name: &str) -> Result<()> {
        self.inner.open(name).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(unavailable("keys"));
        }
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        if self.undeletable.lock().unwrap().contains(name) {
            return Err(unavailable("delete"));
        }
        self.inner.delete(name).await
    }

    async fn match_request(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("match"));
        }
        self.inner.match_request(name, key).await
    }

    async fn put(&self, name: &str, key: RequestKey, response: CachedResponse) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable("put"));
        }
        self.inner.put(name, key, response).await
    }

    async fn len(&self, name: &str) -> Result<usize> {
        self.inner.len(name).await
    }
}
