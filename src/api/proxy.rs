//! Conversion between axum HTTP types and intercepted request/response snapshots.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    response::Response,
};
use url::Url;

use crate::controller::ServedFrom;
use crate::error::{CacheError, Result};
use crate::fetch::end_to_end_headers;
use crate::models::{FetchRequest, FetchResponse, RequestMode};

/// Largest request body accepted for forwarding.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Response header naming where the body came from.
pub const SERVED_FROM_HEADER: &str = "x-offline-cache";

/// Derives the request mode from fetch metadata.
///
/// `Sec-Fetch-Mode` wins when present. Without it, a GET that accepts HTML is
/// treated as a navigation.
pub fn detect_mode(method: &Method, headers: &HeaderMap) -> RequestMode {
    let fetch_mode = headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase);

    match fetch_mode.as_deref() {
        Some("navigate") => RequestMode::Navigate,
        Some("cors") => RequestMode::Cors,
        Some("no-cors") => RequestMode::NoCors,
        Some(_) => RequestMode::SameOrigin,
        None => {
            let accepts_html = headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|accept| accept.contains("text/html"));
            if *method == Method::GET && accepts_html {
                RequestMode::Navigate
            } else {
                RequestMode::SameOrigin
            }
        }
    }
}

/// Resolves the target URL: absolute-form targets are kept as-is, origin-form
/// targets are resolved against the origin.
fn target_url(origin: &Url, request: &Request) -> Result<Url> {
    let uri = request.uri();
    let resolved = if uri.scheme().is_some() && uri.authority().is_some() {
        Url::parse(&uri.to_string())
    } else {
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
        origin.join(path_and_query)
    };
    resolved.map_err(|e| CacheError::InvalidRequest(format!("bad request target '{}': {}", uri, e)))
}

/// Converts an incoming request into a [`FetchRequest`].
pub async fn into_fetch_request(origin: &Url, request: Request) -> Result<FetchRequest> {
    let url = target_url(origin, &request)?;
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| CacheError::InvalidRequest(format!("unreadable body: {}", e)))?;

    Ok(FetchRequest {
        mode: detect_mode(&parts.method, &parts.headers),
        method: parts.method,
        url,
        headers: parts.headers,
        body: if bytes.is_empty() { None } else { Some(bytes) },
    })
}

/// Converts a routed response into an axum response, tagging its source.
pub fn into_http_response(mut response: FetchResponse, source: Option<ServedFrom>) -> Result<Response> {
    let body = response.bytes()?;

    let mut out = Response::new(Body::from(body));
    *out.status_mut() = response.status;
    *out.headers_mut() = end_to_end_headers(&response.headers);
    if let Some(source) = source {
        out.headers_mut()
            .insert(SERVED_FROM_HEADER, HeaderValue::from_static(source.as_str()));
    }
    Ok(out)
}
