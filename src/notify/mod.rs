//! Notify Module
//!
//! The capability to reach every open page client. Delivery is at-most-once:
//! nothing is persisted and nothing is retried.

mod registry;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ClientMessage;

pub use registry::{ClientRegistry, ClientSubscription};

/// Identifier of one open page client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Channel to the page clients controlled by this controller.
#[async_trait]
pub trait ClientChannel: Send + Sync + 'static {
    /// Takes control of every open client. Returns how many were claimed.
    async fn claim(&self) -> Result<usize>;

    /// Every open client currently controlled.
    async fn match_all(&self) -> Result<Vec<ClientId>>;

    async fn post_message(&self, client: &ClientId, message: &ClientMessage) -> Result<()>;
}
