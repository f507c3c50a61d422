//! Scripted origin for tests and local experiments.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use bytes::Bytes;
use url::Url;

use super::Fetcher;
use crate::error::{CacheError, Result};
use crate::models::{FetchRequest, FetchResponse};

#[derive(Debug, Clone)]
struct Scripted {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Bytes,
}

/// An in-memory origin. Unknown URLs answer 404; `set_offline(true)` makes every
/// fetch fail with a network error.
#[derive(Debug)]
pub struct ScriptedFetcher {
    origin: Url,
    routes: Mutex<HashMap<String, Scripted>>,
    failing: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicU64,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ScriptedFetcher {
    /// Creates an online origin rooted at `origin`.
    pub fn new(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| CacheError::InvalidRequest(format!("bad origin '{}': {}", origin, e)))?;
        Ok(Self {
            origin,
            routes: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            offline: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        })
    }

    fn absolute(&self, path: &str) -> String {
        self.origin
            .join(path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }

    /// Scripts a response for `path` (relative to the origin, or absolute).
    pub fn respond(&self, path: &str, status: StatusCode, body: impl Into<Bytes>) -> &Self {
        locked(&self.routes).insert(
            self.absolute(path),
            Scripted {
                status,
                content_type: None,
                body: body.into(),
            },
        );
        self
    }

    /// Scripts a 200 response with a content type.
    pub fn serve(&self, path: &str, content_type: &'static str, body: impl Into<Bytes>) -> &Self {
        locked(&self.routes).insert(
            self.absolute(path),
            Scripted {
                status: StatusCode::OK,
                content_type: Some(content_type),
                body: body.into(),
            },
        );
        self
    }

    /// Makes fetches of `path` fail with a network error.
    pub fn fail(&self, path: &str) -> &Self {
        locked(&self.failing).insert(self.absolute(path));
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of fetches attempted, including failed ones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut url = request.url.clone();
        url.set_fragment(None);
        let url = String::from(url);

        if self.offline.load(Ordering::SeqCst) || locked(&self.failing).contains(&url) {
            return Err(CacheError::Network(format!("{}: connection refused", url)));
        }

        let scripted = locked(&self.routes).get(&url).cloned();
        Ok(match scripted {
            Some(scripted) => {
                let mut headers = HeaderMap::new();
                if let Some(content_type) = scripted.content_type {
                    headers.insert("content-type", HeaderValue::from_static(content_type));
                }
                FetchResponse::new(scripted.status, scripted.body).with_headers(headers)
            }
            None => FetchResponse::new(StatusCode::NOT_FOUND, "not found"),
        })
    }
}
