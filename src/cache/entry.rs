//! Cache Entry Module
//!
//! Defines the stored response snapshot kept in a cache generation.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use crate::error::Result;
use crate::models::FetchResponse;

// == Cached Response ==
/// Immutable snapshot of a response stored in a generation.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Response status as fetched (not necessarily 2xx for navigations)
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Fully read body
    pub body: Bytes,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
}

impl CachedResponse {
    // == Constructor ==
    /// Creates a snapshot from raw parts, stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            stored_at: current_timestamp_ms(),
        }
    }

    // == From Response ==
    /// Consumes a response (normally a clone of the live one) into a snapshot.
    ///
    /// Fails with `BodyUsed` if the response body was already read.
    pub fn from_response(mut response: FetchResponse) -> Result<Self> {
        let body = response.bytes()?;
        Ok(Self::new(response.status, response.headers, body))
    }

    // == To Response ==
    /// Builds a fresh, unread response from the snapshot.
    ///
    /// Each call yields an independent body, so a cached entry can be served any
    /// number of times.
    pub fn to_response(&self) -> FetchResponse {
        FetchResponse::new(self.status, self.body.clone()).with_headers(self.headers.clone())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use axum::http::HeaderValue;

    #[test]
    fn test_snapshot_from_response() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let response = FetchResponse::new(StatusCode::OK, r#"[{"name":"Rex"}]"#).with_headers(headers);

        let cached = CachedResponse::from_response(response).unwrap();

        assert_eq!(cached.status, StatusCode::OK);
        assert_eq!(cached.body, Bytes::from(r#"[{"name":"Rex"}]"#));
        assert_eq!(cached.headers["content-type"], "application/json");
    }

    #[test]
    fn test_snapshot_from_used_response_fails() {
        let mut response = FetchResponse::new(StatusCode::OK, "gone");
        response.bytes().unwrap();

        let result = CachedResponse::from_response(response);
        assert!(matches!(result, Err(CacheError::BodyUsed)));
    }

    #[test]
    fn test_to_response_is_repeatable() {
        let cached = CachedResponse::new(StatusCode::OK, HeaderMap::new(), "shell");

        let first = cached.to_response().text().unwrap();
        let second = cached.to_response().text().unwrap();

        assert_eq!(first, "shell");
        assert_eq!(second, "shell");
    }
}
