//! Background Tasks Module
//!
//! Contains work that runs detached from the request that started it.
//!
//! # Tasks
//! - Cache write: stores a response snapshot even if the originating request is dropped

mod cache_write;

pub use cache_write::spawn_cache_write;
