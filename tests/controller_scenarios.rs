//! Integration Tests for the offline cache controller
//!
//! Drives install, activate, routing and sync directly against a scripted origin.

use std::sync::Arc;

use axum::http::StatusCode;
use offline_cache::cache::{CacheStorage, MemoryCacheStorage};
use offline_cache::fetch::ScriptedFetcher;
use offline_cache::models::{ClientMessage, FetchRequest};
use offline_cache::notify::ClientRegistry;
use offline_cache::{CacheError, Config, OfflineController, Routed, ServedFrom, WorkerState};

const ORIGIN: &str = "http://localhost:5000";

// == Helper Functions ==

struct Setup {
    controller: OfflineController,
    origin: Arc<ScriptedFetcher>,
    storage: Arc<MemoryCacheStorage>,
    clients: Arc<ClientRegistry>,
}

fn setup(version: &str, assets: &[&str], storage: Arc<MemoryCacheStorage>) -> Setup {
    let config = Config {
        cache_version: version.to_string(),
        origin_url: ORIGIN.to_string(),
        static_assets: assets.iter().map(|s| s.to_string()).collect(),
        ..Config::default()
    };
    let origin = Arc::new(ScriptedFetcher::new(ORIGIN).unwrap());
    let clients = Arc::new(ClientRegistry::new());
    let controller =
        OfflineController::new(&config, storage.clone(), origin.clone(), clients.clone()).unwrap();
    Setup {
        controller,
        origin,
        storage,
        clients,
    }
}

fn serve_default_assets(origin: &ScriptedFetcher) {
    origin
        .serve("/", "text/html", "<html>root</html>")
        .serve("/index.html", "text/html", "<html>shell</html>")
        .serve("/manifest.json", "application/manifest+json", "{}")
        .serve("/logo.svg", "image/svg+xml", "<svg/>")
        .serve("/favicon.ico", "image/x-icon", "ico");
}

fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

async fn served(controller: &OfflineController, request: FetchRequest) -> (String, ServedFrom, StatusCode) {
    match controller.handle_fetch(request).await.unwrap() {
        Routed::Served { response, source } => {
            let status = response.status;
            (response.text().unwrap(), source, status)
        }
        Routed::NotIntercepted(request) => panic!("{} was not intercepted", request.url),
    }
}

// == Install / Activate ==

#[tokio::test]
async fn test_install_populates_every_static_asset() {
    let s = setup(
        "v1",
        &["/", "/index.html", "/manifest.json", "/logo.svg", "/favicon.ico"],
        Arc::new(MemoryCacheStorage::new()),
    );
    serve_default_assets(&s.origin);

    s.controller.install().await.unwrap();

    for path in ["/", "/index.html", "/manifest.json", "/logo.svg", "/favicon.ico"] {
        let key = FetchRequest::get(&url(path)).unwrap().key();
        assert!(
            s.controller.cache().lookup(&key).await.unwrap().is_some(),
            "{} missing after install",
            path
        );
    }
}

#[tokio::test]
async fn test_install_two_assets_then_activation_removes_old_generation() {
    let storage = Arc::new(MemoryCacheStorage::new());
    storage.open("symptom-tracker-v0").await.unwrap();

    let s = setup("symptom-tracker-v1", &["/", "/index.html"], storage);
    s.origin.serve("/", "text/html", "root").serve("/index.html", "text/html", "index");

    let installed = s.controller.install().await.unwrap();
    assert_eq!(installed.cached, 2);
    assert_eq!(s.storage.len("symptom-tracker-v1").await.unwrap(), 2);

    let activated = s.controller.activate().await.unwrap();
    assert_eq!(activated.deleted, vec!["symptom-tracker-v0"]);
    assert_eq!(s.storage.keys().await.unwrap(), vec!["symptom-tracker-v1"]);
}

#[tokio::test]
async fn test_missing_asset_fails_install_and_previous_generation_survives() {
    let storage = Arc::new(MemoryCacheStorage::new());
    let old = setup("v1", &["/", "/index.html"], storage.clone());
    old.origin.serve("/", "text/html", "root").serve("/index.html", "text/html", "index");
    old.controller.start().await.unwrap();

    let new = setup("v2", &["/", "/index.html", "/logo.svg"], storage.clone());
    new.origin.serve("/", "text/html", "root").serve("/index.html", "text/html", "index");

    let result = new.controller.install().await;

    assert!(matches!(result, Err(CacheError::AssetMissing { .. })));
    assert_eq!(new.controller.state().await, WorkerState::Redundant);
    assert_eq!(storage.len("v1").await.unwrap(), 2);
    assert_eq!(storage.len("v2").await.unwrap(), 0);
}

// == API Routing ==

#[tokio::test]
async fn test_api_success_served_from_cache_when_offline() {
    let s = setup("v1", &["/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin
        .serve("/index.html", "text/html", "shell")
        .serve("/api/pets", "application/json", r#"[{"name":"Biscuit"}]"#);
    s.controller.start().await.unwrap();

    let (body, source, _) = served(&s.controller, FetchRequest::get(&url("/api/pets")).unwrap()).await;
    assert_eq!(source, ServedFrom::Network);
    assert_eq!(body, r#"[{"name":"Biscuit"}]"#);

    s.origin.set_offline(true);
    let (body, source, status) = served(&s.controller, FetchRequest::get(&url("/api/pets")).unwrap()).await;
    assert_eq!(source, ServedFrom::Cache);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"name":"Biscuit"}]"#);
}

#[tokio::test]
async fn test_api_failure_status_not_cached() {
    let s = setup("v1", &["/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin
        .serve("/index.html", "text/html", "shell")
        .respond("/api/pets", StatusCode::UNAUTHORIZED, "login required");
    s.controller.start().await.unwrap();

    let (_, _, status) = served(&s.controller, FetchRequest::get(&url("/api/pets")).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let key = FetchRequest::get(&url("/api/pets")).unwrap().key();
    assert!(s.controller.cache().lookup(&key).await.unwrap().is_none());

    s.origin.set_offline(true);
    let result = s.controller.handle_fetch(FetchRequest::get(&url("/api/pets")).unwrap()).await;
    assert!(matches!(result, Err(CacheError::Network(_))));
}

// == Navigation Routing ==

#[tokio::test]
async fn test_offline_navigation_falls_back_to_index() {
    let s = setup("v1", &["/", "/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin.serve("/", "text/html", "root").serve("/index.html", "text/html", "<html>shell</html>");
    s.controller.start().await.unwrap();
    s.origin.set_offline(true);

    let (body, source, _) =
        served(&s.controller, FetchRequest::navigate(&url("/pets/7/symptoms")).unwrap()).await;

    assert_eq!(source, ServedFrom::OfflineShell);
    assert_eq!(body, "<html>shell</html>");
    assert_eq!(s.controller.stats().await.offline_fallbacks, 1);
}

#[tokio::test]
async fn test_offline_navigation_prefers_exact_cached_page() {
    let s = setup("v1", &["/", "/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin.serve("/", "text/html", "root").serve("/index.html", "text/html", "shell");
    s.controller.start().await.unwrap();

    s.origin.set_offline(true);
    let (body, source, _) = served(&s.controller, FetchRequest::navigate(&url("/")).unwrap()).await;

    assert_eq!(source, ServedFrom::Cache);
    assert_eq!(body, "root");
}

// == Static Routing ==

#[tokio::test]
async fn test_static_cache_first_skips_network() {
    let s = setup("v1", &["/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin
        .serve("/index.html", "text/html", "shell")
        .serve("/static/css/main.css", "text/css", "body{}");
    s.controller.start().await.unwrap();
    let calls_after_install = s.origin.calls();

    served(&s.controller, FetchRequest::get(&url("/static/css/main.css")).unwrap()).await;
    let (body, source, _) =
        served(&s.controller, FetchRequest::get(&url("/static/css/main.css")).unwrap()).await;

    assert_eq!(source, ServedFrom::Cache);
    assert_eq!(body, "body{}");
    assert_eq!(s.origin.calls(), calls_after_install + 1);
}

// == Background Sync ==

#[tokio::test]
async fn test_sync_reaches_each_open_client_exactly_once() {
    let s = setup("v1", &["/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin.serve("/index.html", "text/html", "shell");
    let mut receivers = Vec::new();
    for _ in 0..3 {
        receivers.push(s.clients.register().await.1);
    }
    s.controller.start().await.unwrap();

    assert!(s.controller.handle_sync("sync-submissions").await);

    for rx in receivers.iter_mut() {
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::SyncOfflineSubmissions);
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn test_sync_with_disconnected_client_still_reaches_others() {
    let s = setup("v1", &["/index.html"], Arc::new(MemoryCacheStorage::new()));
    s.origin.serve("/index.html", "text/html", "shell");
    let (_gone, gone_rx) = s.clients.register().await;
    let (_open, mut open_rx) = s.clients.register().await;
    s.controller.start().await.unwrap();
    drop(gone_rx);

    assert!(s.controller.handle_sync("sync-submissions").await);
    assert_eq!(open_rx.try_recv().unwrap(), ClientMessage::SyncOfflineSubmissions);
}
