//! Response DTOs for the control endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the health endpoint (GET /__offline/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status ("healthy" once controlling, "degraded" otherwise)
    pub status: String,
    /// Lifecycle state of the controller
    pub state: String,
    /// Current cache generation
    pub cache_version: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn new(state: impl Into<String>, controlling: bool, cache_version: impl Into<String>) -> Self {
        Self {
            status: if controlling { "healthy" } else { "degraded" }.to_string(),
            state: state.into(),
            cache_version: cache_version.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the stats endpoint (GET /__offline/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current cache generation
    pub cache_version: String,
    /// Entries stored in the current generation
    pub total_entries: usize,
    /// Requests answered from cache
    pub hits: u64,
    /// Cache lookups that found nothing
    pub misses: u64,
    /// Requests answered by the network
    pub network_responses: u64,
    /// Responses written to cache
    pub stored: u64,
    /// Responses not written because of a non-success status
    pub skipped_stores: u64,
    /// Navigations answered with the offline shell
    pub offline_fallbacks: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(cache_version: impl Into<String>, total_entries: usize, stats: &CacheStats) -> Self {
        Self {
            cache_version: cache_version.into(),
            total_entries,
            hits: stats.hits,
            misses: stats.misses,
            network_responses: stats.network_responses,
            stored: stats.stored,
            skipped_stores: stats.skipped_stores,
            offline_fallbacks: stats.offline_fallbacks,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the reconnect signal (POST /__offline/sync)
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    /// The tag that was signalled
    pub tag: String,
    /// False if client enumeration or posting failed
    pub success: bool,
}

impl SyncResponse {
    pub fn new(tag: impl Into<String>, success: bool) -> Self {
        Self {
            tag: tag.into(),
            success,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
