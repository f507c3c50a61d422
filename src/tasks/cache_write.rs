//! Cache Write Task
//!
//! Detached write of a response snapshot into the current generation.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheManager, CachedResponse};
use crate::error::Result;
use crate::models::RequestKey;

/// Spawns a task that writes `snapshot` under `key` in the current generation.
///
/// The write runs on its own task, so it completes even when the request that
/// produced the response is aborted and its future dropped. Callers on the normal
/// path await the handle; nobody is required to.
///
/// # Example
/// ```ignore
/// let handle = spawn_cache_write(cache.clone(), request.key(), snapshot);
/// // Request may be cancelled here; the write still finishes.
/// let stored = handle.await;
/// ```
pub fn spawn_cache_write(
    cache: CacheManager,
    key: RequestKey,
    snapshot: CachedResponse,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let generation = cache.current().to_string();
        match cache.store(key.clone(), snapshot).await {
            Ok(()) => {
                debug!(generation = %generation, key = %key, "cache write complete");
                Ok(())
            }
            Err(e) => {
                warn!(generation = %generation, key = %key, error = %e, "cache write failed");
                Err(e)
            }
        }
    })
}
