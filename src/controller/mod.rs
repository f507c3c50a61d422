//! Offline Cache Controller
//!
//! Lifecycle (install, activate), per-request routing and the background sync
//! handshake. The cache manager, fetcher and client channel are injected, so
//! every transition can be driven directly from tests.

mod router;
mod strategies;


use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use futures::future::try_join_all;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::cache::{CacheManager, CacheStats, CacheStorage, CachedResponse};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::fetch::Fetcher;
use crate::models::message::SYNC_SUBMISSIONS_TAG;
use crate::models::{ClientMessage, FetchRequest, FetchResponse, RequestKey};
use crate::notify::ClientChannel;

pub use router::{RequestClass, RequestRouter};
pub use strategies::{
    cache_first, network_first, network_first_with_shell, ServedFrom, StorePolicy,
    StrategyContext,
};

// == Worker State ==
/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    /// Installed, not yet controlling pages
    Waiting,
    Controlling,
    /// Install failed; never activates
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Controlling => "controlling",
            WorkerState::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Static assets written to the current generation
    pub cached: usize,
    /// Install asks to activate immediately
    pub skip_waiting: bool,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateOutcome {
    /// Stale generations that were deleted
    pub deleted: Vec<String>,
    /// Clients taken under control
    pub claimed: usize,
}

/// Outcome of routing one request.
#[derive(Debug)]
pub enum Routed {
    Served {
        response: FetchResponse,
        source: ServedFrom,
    },
    /// Left to default network handling
    NotIntercepted(FetchRequest),
}

// == Offline Controller ==
pub struct OfflineController {
    origin: Url,
    static_assets: Vec<String>,
    router: RequestRouter,
    ctx: StrategyContext,
    clients: Arc<dyn ClientChannel>,
    state: RwLock<WorkerState>,
}

impl OfflineController {
    // == Constructor ==
    /// Builds a controller in the `Installing` state.
    pub fn new(
        config: &Config,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn ClientChannel>,
    ) -> Result<Self> {
        let origin = Url::parse(&config.origin_url).map_err(|e| {
            CacheError::InvalidRequest(format!("bad origin '{}': {}", config.origin_url, e))
        })?;
        let shell_url = join_path(&origin, &config.offline_shell)?;

        Ok(Self {
            router: RequestRouter::new(&origin, config.api_marker.clone()),
            ctx: StrategyContext {
                cache: CacheManager::new(storage, config.cache_version.clone()),
                fetcher,
                stats: Arc::new(RwLock::new(CacheStats::new())),
                shell: RequestKey::get(&shell_url),
            },
            static_assets: config.static_assets.clone(),
            origin,
            clients,
            state: RwLock::new(WorkerState::Installing),
        })
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn cache(&self) -> &CacheManager {
        &self.ctx.cache
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn router(&self) -> &RequestRouter {
        &self.router
    }

    pub async fn stats(&self) -> CacheStats {
        self.ctx.stats.read().await.clone()
    }

    // == Install ==
    /// Opens the current generation and caches every static asset.
    ///
    /// All assets are fetched before any is stored, so a failed install leaves
    /// no partial entries behind. Failure moves the controller to `Redundant`.
    pub async fn install(&self) -> Result<InstallOutcome> {
        let mut state = self.state.write().await;
        if *state != WorkerState::Installing {
            return Err(CacheError::InvalidState(format!("cannot install while {}", state)));
        }

        info!(
            generation = %self.ctx.cache.current(),
            assets = self.static_assets.len(),
            "installing"
        );

        match self.precache().await {
            Ok(cached) => {
                *state = WorkerState::Waiting;
                info!(cached, "install complete");
                Ok(InstallOutcome {
                    cached,
                    skip_waiting: true,
                })
            }
            Err(e) => {
                *state = WorkerState::Redundant;
                error!(error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        self.ctx.cache.open_current().await?;

        let fetches = self.static_assets.iter().map(|path| async move {
            let missing = |reason: String| CacheError::AssetMissing {
                path: path.clone(),
                reason,
            };
            let url = join_path(&self.origin, path).map_err(|e| missing(e.to_string()))?;
            let request = FetchRequest::new(Method::GET, url);
            let response = self
                .ctx
                .fetcher
                .fetch(&request)
                .await
                .map_err(|e| missing(e.to_string()))?;
            if !response.ok() {
                return Err(missing(format!("status {}", response.status)));
            }
            Ok::<_, CacheError>((request.key(), CachedResponse::from_response(response)?))
        });
        let snapshots = try_join_all(fetches).await?;

        let count = snapshots.len();
        for (key, snapshot) in snapshots {
            self.ctx.cache.store(key, snapshot).await?;
        }
        Ok(count)
    }

    // == Activate ==
    /// Deletes every stale generation and takes control of open clients.
    pub async fn activate(&self) -> Result<ActivateOutcome> {
        let mut state = self.state.write().await;
        if *state != WorkerState::Waiting {
            return Err(CacheError::InvalidState(format!("cannot activate while {}", state)));
        }

        let deleted = self.ctx.cache.purge_stale().await?;
        let claimed = match self.clients.claim().await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(error = %e, "failed to claim clients");
                0
            }
        };

        *state = WorkerState::Controlling;
        info!(
            generation = %self.ctx.cache.current(),
            deleted = deleted.len(),
            claimed,
            "activated"
        );
        Ok(ActivateOutcome { deleted, claimed })
    }

    /// Install, then activate straight away.
    pub async fn start(&self) -> Result<ActivateOutcome> {
        let installed = self.install().await?;
        debug!(skip_waiting = installed.skip_waiting, "install requested activation");
        self.activate().await
    }

    // == Handle Fetch ==
    /// Routes one intercepted request.
    ///
    /// Nothing is intercepted until the controller is `Controlling`.
    pub async fn handle_fetch(&self, request: FetchRequest) -> Result<Routed> {
        if self.state().await != WorkerState::Controlling {
            return Ok(Routed::NotIntercepted(request));
        }

        let class = self.router.classify(&request);
        debug!(method = %request.method, url = %request.url, class = class.as_str(), "routing request");

        let (response, source) = match class {
            RequestClass::CrossOrigin => return Ok(Routed::NotIntercepted(request)),
            RequestClass::Api => network_first(&self.ctx, &request).await?,
            RequestClass::Navigation => network_first_with_shell(&self.ctx, &request).await?,
            RequestClass::Static => cache_first(&self.ctx, &request).await?,
        };
        Ok(Routed::Served { response, source })
    }

    /// Default network handling for requests that were not intercepted.
    pub async fn passthrough(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.ctx.fetcher.fetch(request).await
    }

    // == Handle Sync ==
    /// Handles a reconnect signal. Returns false if notifying clients failed.
    ///
    /// Only `sync-submissions` is acted on; other tags are ignored and succeed.
    pub async fn handle_sync(&self, tag: &str) -> bool {
        if tag != SYNC_SUBMISSIONS_TAG {
            debug!(tag, "ignoring unknown sync tag");
            return true;
        }

        match self.notify_clients(ClientMessage::SyncOfflineSubmissions).await {
            Ok(notified) => {
                info!(tag, notified, "sync notification sent");
                true
            }
            Err(e) => {
                error!(tag, error = %e, "sync notification failed");
                false
            }
        }
    }

    /// Posts `message` once to every controlled client. Every client is attempted
    /// even if an earlier post fails.
    async fn notify_clients(&self, message: ClientMessage) -> Result<usize> {
        let clients = self.clients.match_all().await?;

        let mut failures = Vec::new();
        for client in &clients {
            if let Err(e) = self.clients.post_message(client, &message).await {
                warn!(client = %client, error = %e, "failed to post message");
                failures.push(client.to_string());
            }
        }

        if failures.is_empty() {
            Ok(clients.len())
        } else {
            Err(CacheError::Notify(format!(
                "{} of {} clients unreachable: {}",
                failures.len(),
                clients.len(),
                failures.join(", ")
            )))
        }
    }
}

fn join_path(origin: &Url, path: &str) -> Result<Url> {
    origin
        .join(path)
        .map_err(|e| CacheError::InvalidRequest(format!("bad path '{}': {}", path, e)))
}
