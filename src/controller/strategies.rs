//! Caching strategies.
//!
//! Every branch that both stores and returns a network response clones it before
//! anything reads the body: the clone goes to the cache, the original to the caller.

use std::sync::Arc;

use axum::http::Method;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheManager, CacheStats, CachedResponse};
use crate::error::{CacheError, Result};
use crate::fetch::Fetcher;
use crate::models::{FetchRequest, FetchResponse, RequestKey};
use crate::tasks::spawn_cache_write;

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Network,
    Cache,
    /// Cached root document served for an uncached offline navigation
    OfflineShell,
}

impl ServedFrom {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedFrom::Network => "network",
            ServedFrom::Cache => "cache",
            ServedFrom::OfflineShell => "shell",
        }
    }
}

/// Which network responses get written to cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePolicy {
    /// 2xx only
    SuccessOnly,
    /// Any status
    Always,
}

/// Everything a strategy needs: the injected cache manager and fetcher.
#[derive(Clone)]
pub struct StrategyContext {
    pub cache: CacheManager,
    pub fetcher: Arc<dyn Fetcher>,
    pub stats: Arc<RwLock<CacheStats>>,
    /// Key of the offline shell document
    pub shell: RequestKey,
}

impl StrategyContext {
    /// Looks up `key`, treating a storage failure as a miss.
    async fn cached(&self, key: &RequestKey) -> Option<CachedResponse> {
        if key.method != Method::GET {
            return None;
        }
        let found = match self.cache.lookup(key).await {
            Ok(found) => found,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        };

        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.record_hit();
        } else {
            stats.record_miss();
        }
        found
    }

    /// Clones `response` and writes the clone to cache under `key`.
    ///
    /// Only GET responses are stored. Write failures are logged and dropped; the
    /// caller's response is untouched either way.
    async fn store_copy(&self, key: RequestKey, response: &FetchResponse, policy: StorePolicy) {
        if key.method != Method::GET {
            return;
        }
        if policy == StorePolicy::SuccessOnly && !response.ok() {
            debug!(key = %key, status = %response.status, "not caching non-success response");
            self.stats.write().await.record_skipped_store();
            return;
        }

        let snapshot = match response.try_clone().and_then(CachedResponse::from_response) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(key = %key, error = %e, "could not snapshot response");
                return;
            }
        };

        match spawn_cache_write(self.cache.clone(), key, snapshot).await {
            Ok(Ok(())) => self.stats.write().await.record_store(),
            Ok(Err(_)) => {}
            Err(e) => warn!(error = %e, "cache write task failed"),
        }
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let response = self.fetcher.fetch(request).await?;
        self.stats.write().await.record_network();
        Ok(response)
    }
}

// == Network First ==
/// Network, storing 2xx responses; on network failure the exact cached entry.
pub async fn network_first(
    ctx: &StrategyContext,
    request: &FetchRequest,
) -> Result<(FetchResponse, ServedFrom)> {
    let key = request.key();
    match ctx.fetch(request).await {
        Ok(response) => {
            ctx.store_copy(key, &response, StorePolicy::SuccessOnly).await;
            Ok((response, ServedFrom::Network))
        }
        Err(e) if e.is_network() => {
            debug!(url = %request.url, error = %e, "network failed, trying cache");
            match ctx.cached(&key).await {
                Some(cached) => Ok((cached.to_response(), ServedFrom::Cache)),
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

// == Network First With Shell ==
/// Network, storing every response; on network failure the exact cached entry,
/// then the offline shell.
pub async fn network_first_with_shell(
    ctx: &StrategyContext,
    request: &FetchRequest,
) -> Result<(FetchResponse, ServedFrom)> {
    let key = request.key();
    match ctx.fetch(request).await {
        Ok(response) => {
            ctx.store_copy(key, &response, StorePolicy::Always).await;
            Ok((response, ServedFrom::Network))
        }
        Err(e) if e.is_network() => {
            debug!(url = %request.url, error = %e, "navigation offline, trying cache");
            if let Some(cached) = ctx.cached(&key).await {
                return Ok((cached.to_response(), ServedFrom::Cache));
            }
            // The shell itself was just looked up
            if key != ctx.shell {
                if let Some(shell) = ctx.cached(&ctx.shell).await {
                    ctx.stats.write().await.record_offline_fallback();
                    return Ok((shell.to_response(), ServedFrom::OfflineShell));
                }
            }
            Err(CacheError::OfflineMiss(request.url.to_string()))
        }
        Err(e) => Err(e),
    }
}

// == Cache First ==
/// Cached entry if present; otherwise network, storing 2xx responses.
pub async fn cache_first(
    ctx: &StrategyContext,
    request: &FetchRequest,
) -> Result<(FetchResponse, ServedFrom)> {
    let key = request.key();
    if let Some(cached) = ctx.cached(&key).await {
        return Ok((cached.to_response(), ServedFrom::Cache));
    }

    let response = ctx.fetch(request).await?;
    ctx.store_copy(key, &response, StorePolicy::SuccessOnly).await;
    Ok((response, ServedFrom::Network))
}
