//! Request and Response models for the offline cache
//!
//! This module defines the intercepted request/response snapshots the controller
//! routes, the message pushed to page clients, and the DTOs used for
//! serializing/deserializing control endpoint bodies.

pub mod fetch;
pub mod message;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use fetch::{Body, FetchRequest, FetchResponse, RequestKey, RequestMode};
pub use message::ClientMessage;
pub use requests::SyncRequest;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse, SyncResponse};
