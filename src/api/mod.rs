//! API Module
//!
//! HTTP surface of the offline proxy.
//!
//! # Endpoints
//! - `GET /__offline/health` - Controller health and lifecycle state
//! - `GET /__offline/stats` - Cache statistics
//! - `POST /__offline/sync` - Deliver a background sync signal
//! - `GET /__offline/events` - Server-sent events stream for page clients
//! - anything else - Routed through the offline cache controller

pub mod handlers;
pub mod proxy;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, CONTROL_PREFIX};
