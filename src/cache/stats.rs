//! Cache Statistics Module
//!
//! Tracks routing outcomes: cache hits and misses, network responses, stores and
//! offline fallbacks.

use serde::Serialize;

// == Cache Stats ==
/// Tracks controller performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of requests answered from cache
    pub hits: u64,
    /// Number of cache lookups that found nothing
    pub misses: u64,
    /// Number of requests answered by a live network response
    pub network_responses: u64,
    /// Number of responses written to the current generation
    pub stored: u64,
    /// Number of responses not written because the status was not 2xx
    pub skipped_stores: u64,
    /// Number of navigations answered with the offline shell
    pub offline_fallbacks: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_network(&mut self) {
        self.network_responses += 1;
    }

    pub fn record_store(&mut self) {
        self.stored += 1;
    }

    pub fn record_skipped_store(&mut self) {
        self.skipped_stores += 1;
    }

    pub fn record_offline_fallback(&mut self) {
        self.offline_fallbacks += 1;
    }
}
