//! Cache Generation Module
//!
//! One named, versioned map of request keys to response snapshots.

use std::collections::HashMap;

use crate::cache::CachedResponse;
use crate::models::RequestKey;

// == Generation ==
/// A single cache generation.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generation identifier (the cache version)
    name: String,
    /// Request key -> stored snapshot
    entries: HashMap<RequestKey, CachedResponse>,
}

impl Generation {
    // == Constructor ==
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Put ==
    /// Stores a snapshot, overwriting any previous entry for the same key.
    ///
    /// Returns true if an existing entry was replaced.
    pub fn put(&mut self, key: RequestKey, response: CachedResponse) -> bool {
        self.entries.insert(key, response).is_some()
    }

    // == Get ==
    pub fn get(&self, key: &RequestKey) -> Option<&CachedResponse> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
