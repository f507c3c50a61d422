//! Request classification.
//!
//! Rules are evaluated in order and the first match wins: cross-origin, API,
//! navigation, then everything else.

use url::{Origin, Url};

use crate::models::FetchRequest;

/// Routing class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Different origin; left to default network handling
    CrossOrigin,
    /// Path contains the API marker; network-first
    Api,
    /// Top-level page load; network-first with offline shell
    Navigation,
    /// Scripts, styles, images; cache-first
    Static,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::CrossOrigin => "cross-origin",
            RequestClass::Api => "api",
            RequestClass::Navigation => "navigation",
            RequestClass::Static => "static",
        }
    }
}

/// Maps a request to its [`RequestClass`].
#[derive(Debug, Clone)]
pub struct RequestRouter {
    origin: Origin,
    api_marker: String,
}

impl RequestRouter {
    pub fn new(origin: &Url, api_marker: impl Into<String>) -> Self {
        Self {
            origin: origin.origin(),
            api_marker: api_marker.into(),
        }
    }

    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        if request.url.origin() != self.origin {
            RequestClass::CrossOrigin
        } else if request.url.path().contains(&self.api_marker) {
            RequestClass::Api
        } else if request.is_navigation() {
            RequestClass::Navigation
        } else {
            RequestClass::Static
        }
    }
}
