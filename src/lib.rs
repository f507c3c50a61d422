//! Offline Cache - an offline caching proxy for a progressive web app
//!
//! Routes page requests through network-first or cache-first strategies, keeps
//! exactly one versioned cache generation current, and tells open page clients
//! when deferred submissions can be replayed.

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use controller::{OfflineController, Routed, ServedFrom, WorkerState};
pub use error::{CacheError, Result};
