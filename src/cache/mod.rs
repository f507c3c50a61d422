//! Cache Module
//!
//! Provides versioned cache generations of request/response snapshots and the
//! manager that keeps exactly one generation current.

mod entry;
#[cfg(test)]
mod faulty;
mod generation;
mod manager;
mod stats;
mod storage;

// Re-export public types
pub use entry::{current_timestamp_ms, CachedResponse};
pub use generation::Generation;
pub use manager::CacheManager;
pub use stats::CacheStats;
pub use storage::{CacheStorage, MemoryCacheStorage};

#[cfg(test)]
pub(crate) use faulty::FaultyStorage;
