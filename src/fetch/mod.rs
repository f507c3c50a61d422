//! Fetch Module
//!
//! The network seam. The controller never talks to the origin directly; it goes
//! through a [`Fetcher`], so routing can be exercised without a live server.

mod http;
mod scripted;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FetchRequest, FetchResponse};

pub(crate) use http::end_to_end_headers;
pub use http::HttpFetcher;
pub use scripted::ScriptedFetcher;

/// Performs a network fetch for an intercepted request.
///
/// Any transport failure must be reported as `CacheError::Network`. Non-2xx
/// statuses are successful fetches.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}
