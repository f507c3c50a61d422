//! Intercepted request and response snapshots
//!
//! A [`FetchResponse`] carries a one-shot [`Body`]: reading it consumes it, and a
//! response can only be cloned while its body is still unread. Every strategy that
//! both stores and returns a response must therefore clone before the first read.

use std::fmt;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use url::Url;

use crate::error::{CacheError, Result};

// == Request Mode ==
/// How the page issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page load
    Navigate,
    /// Subresource on the page's own origin
    #[default]
    SameOrigin,
    Cors,
    NoCors,
}

// == Request Key ==
/// Cache entry key: method plus full URL (fragment excluded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method,
            url: url.into(),
        }
    }

    /// Key for a plain GET of `url`.
    pub fn get(url: &Url) -> Self {
        Self::new(Method::GET, url)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// == Fetch Request ==
/// A request intercepted from the page.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// Creates a same-origin request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            mode: RequestMode::default(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parses `url` into a GET request.
    pub fn get(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| CacheError::InvalidRequest(format!("bad url '{}': {}", url, e)))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Parses `url` into a top-level navigation.
    pub fn navigate(url: &str) -> Result<Self> {
        Ok(Self::get(url)?.with_mode(RequestMode::Navigate))
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.clone(), &self.url)
    }
}

// == Body ==
/// A body that can be read exactly once.
#[derive(Debug, Default)]
pub struct Body {
    bytes: Option<Bytes>,
}

impl Body {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// True once the body has been read.
    pub fn is_used(&self) -> bool {
        self.bytes.is_none()
    }

    /// Reads the body, leaving it used.
    pub fn take(&mut self) -> Result<Bytes> {
        self.bytes.take().ok_or(CacheError::BodyUsed)
    }

    /// Produces an independent, unread copy. Fails once the body has been read.
    pub fn try_clone(&self) -> Result<Body> {
        match &self.bytes {
            Some(bytes) => Ok(Body::new(bytes.clone())),
            None => Err(CacheError::BodyUsed),
        }
    }
}

// == Fetch Response ==
/// A response from the network or rebuilt from a cache entry.
#[derive(Debug)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::new(body),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn body_used(&self) -> bool {
        self.body.is_used()
    }

    /// Clones status, headers and an unread copy of the body.
    pub fn try_clone(&self) -> Result<FetchResponse> {
        Ok(FetchResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.try_clone()?,
        })
    }

    /// Reads the body, leaving this response used.
    pub fn bytes(&mut self) -> Result<Bytes> {
        self.body.take()
    }

    pub fn text(mut self) -> Result<String> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
