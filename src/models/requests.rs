//! Request DTOs for the control endpoints
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for the reconnect signal (POST /__offline/sync)
///
/// # Fields
/// - `tag`: The background sync tag that became eligible for retry
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    /// The sync tag
    pub tag: String,
}

impl SyncRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tag.trim().is_empty() {
            return Some("Sync tag cannot be empty".to_string());
        }
        None
    }
}
