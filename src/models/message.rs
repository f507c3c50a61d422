//! Messages pushed to open page clients.

use serde::{Deserialize, Serialize};

/// Tag of the background sync that replays offline submissions.
pub const SYNC_SUBMISSIONS_TAG: &str = "sync-submissions";

/// Message posted to every open client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Connectivity is back; the page should replay its queued submissions
    #[serde(rename = "SYNC_OFFLINE_SUBMISSIONS")]
    SyncOfflineSubmissions,
}
