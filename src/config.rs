//! Configuration Module
//!
//! Handles loading and managing controller configuration from environment variables.

use std::env;

/// Default bootstrap resources cached at install time.
pub const DEFAULT_STATIC_ASSETS: &[&str] =
    &["/", "/index.html", "/manifest.json", "/logo.svg", "/favicon.ico"];

/// Offline proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the current cache generation; bump on deploy
    pub cache_version: String,
    /// Base URL of the origin server, also the same-origin scope
    pub origin_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Path substring that marks API requests
    pub api_marker: String,
    /// Root-relative path served when a navigation is offline and uncached
    pub offline_shell: String,
    /// Root-relative paths cached during install
    pub static_assets: Vec<String>,
    /// Forward absolute-form requests for other origins instead of refusing them
    pub forward_cross_origin: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_VERSION` - Current generation name (default: symptom-tracker-v1)
    /// - `ORIGIN_URL` - Origin server base URL (default: http://127.0.0.1:5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `API_MARKER` - API path marker (default: /api/)
    /// - `OFFLINE_SHELL` - Offline navigation fallback (default: /index.html)
    /// - `STATIC_ASSETS` - Comma-separated install list
    /// - `FORWARD_CROSS_ORIGIN` - Forward requests for other origins (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_version: non_empty_var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            origin_url: non_empty_var("ORIGIN_URL").unwrap_or(defaults.origin_url),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            api_marker: non_empty_var("API_MARKER").unwrap_or(defaults.api_marker),
            offline_shell: non_empty_var("OFFLINE_SHELL").unwrap_or(defaults.offline_shell),
            static_assets: non_empty_var("STATIC_ASSETS")
                .map(|v| parse_asset_list(&v))
                .filter(|assets| !assets.is_empty())
                .unwrap_or(defaults.static_assets),
            forward_cross_origin: non_empty_var("FORWARD_CROSS_ORIGIN")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.forward_cross_origin),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_version: "symptom-tracker-v1".to_string(),
            origin_url: "http://127.0.0.1:5000".to_string(),
            server_port: 3000,
            api_marker: "/api/".to_string(),
            offline_shell: "/index.html".to_string(),
            static_assets: DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            forward_cross_origin: false,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Splits a comma-separated path list, dropping blanks.
pub fn parse_asset_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
