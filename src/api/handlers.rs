//! API Handlers
//!
//! HTTP request handlers for the control endpoints and the proxy fallback.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Response,
    },
    Json,
};
use futures::Stream;
use tracing::{info, warn};

use super::proxy::{into_fetch_request, into_http_response};
use crate::cache::MemoryCacheStorage;
use crate::config::Config;
use crate::controller::{OfflineController, Routed, WorkerState};
use crate::error::{CacheError, Result};
use crate::fetch::HttpFetcher;
use crate::models::{HealthResponse, StatsResponse, SyncRequest, SyncResponse};
use crate::notify::ClientRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The offline cache controller
    pub controller: Arc<OfflineController>,
    /// Connected page clients
    pub clients: Arc<ClientRegistry>,
    /// Forward absolute-form requests for other origins
    pub forward_cross_origin: bool,
}

impl AppState {
    /// Creates a new AppState around an already built controller.
    ///
    /// `clients` must be the same registry the controller notifies.
    pub fn new(controller: OfflineController, clients: Arc<ClientRegistry>) -> Self {
        Self {
            controller: Arc::new(controller),
            clients,
            forward_cross_origin: false,
        }
    }

    /// Allows or refuses forwarding of requests for other origins.
    pub fn with_cross_origin_forwarding(mut self, allow: bool) -> Self {
        self.forward_cross_origin = allow;
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires in-memory generations, a reqwest fetcher and a client registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let clients = Arc::new(ClientRegistry::new());
        let controller = OfflineController::new(
            config,
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(HttpFetcher::new()),
            clients.clone(),
        )?;
        Ok(Self::new(controller, clients).with_cross_origin_forwarding(config.forward_cross_origin))
    }
}

/// Handler for GET /__offline/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let worker_state = state.controller.state().await;
    Json(HealthResponse::new(
        worker_state.as_str(),
        worker_state == WorkerState::Controlling,
        state.controller.cache().current(),
    ))
}

/// Handler for GET /__offline/stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.controller.stats().await;
    let entries = state.controller.cache().entry_count().await?;

    Ok(Json(StatsResponse::new(
        state.controller.cache().current(),
        entries,
        &stats,
    )))
}

/// Handler for POST /__offline/sync
///
/// Delivers a reconnect signal for a background sync tag.
pub async fn sync_handler(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let success = state.controller.handle_sync(&req.tag).await;
    Ok(Json(SyncResponse::new(req.tag, success)))
}

/// Handler for GET /__offline/events
///
/// Registers the caller as a page client and streams its messages as
/// server-sent events. The client is unregistered once the stream is dropped.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let subscription = state.clients.subscribe().await;
    info!(client = %subscription.id(), "page client connected");

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        Some((Event::default().json_data(message), subscription))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Fallback handler: routes every other request through the controller.
///
/// Requests for other origins are refused unless cross-origin forwarding is
/// enabled, so the proxy is not an open forwarder.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let request = into_fetch_request(state.controller.origin(), request).await?;

    match state.controller.handle_fetch(request).await? {
        Routed::Served { response, source } => into_http_response(response, Some(source)),
        Routed::NotIntercepted(request) => {
            let same_origin = request.url.origin() == state.controller.origin().origin();
            if !same_origin && !state.forward_cross_origin {
                warn!(url = %request.url, "refusing cross-origin forward");
                return Err(CacheError::Forbidden(format!(
                    "cross-origin forwarding disabled: {}",
                    request.url
                )));
            }
            let response = state.controller.passthrough(&request).await?;
            into_http_response(response, None)
        }
    }
}
