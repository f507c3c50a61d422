//! Origin fetcher backed by reqwest.

use async_trait::async_trait;
use axum::http::HeaderMap;
use tracing::debug;

use super::Fetcher;
use crate::error::{CacheError, Result};
use crate::models::{FetchRequest, FetchResponse};

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "host",
    "content-length",
    "transfer-encoding",
    "upgrade",
    "proxy-authorization",
    "te",
    "trailer",
    "keep-alive",
];

/// Forwards requests to the network. No timeout is imposed.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Copies `headers` without hop-by-hop entries.
pub(crate) fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP {
        forwarded.remove(*name);
    }
    forwarded
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        debug!(method = %request.method, url = %request.url, "fetching from network");

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(end_to_end_headers(&request.headers));
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CacheError::Network(format!("{}: {}", request.url, e)))?;

        let status = response.status();
        let headers = end_to_end_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Network(format!("{}: {}", request.url, e)))?;

        Ok(FetchResponse::new(status, body).with_headers(headers))
    }
}
