//! Core components of the `cached-fetch` request layer.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`CachedFetch`] orchestrator and its builder.
//! - The primary [`FetchError`] type.
//! - Cache policy resolution, key derivation and the cache store seam.
//! - The single-call network executor.

/// The orchestrator (`CachedFetch`), builder, retry policy and defaults.
pub mod client;
/// Partial and effective cache policies and their resolution.
pub mod config;
/// The primary error type (`FetchError`) for the crate.
pub mod error;
/// Canonical cache key derivation.
pub mod key;
/// Request descriptors and per-call options.
pub mod models;
/// The cache store trait and its in-memory implementation.
pub mod store;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::CachedFetch`
pub use client::{CachedFetch, CachedFetchBuilder, RetryConfig};
pub use config::{CacheConfig, EffectiveCacheConfig};
pub use error::FetchError;
pub use key::{KeyGenerator, generate_cache_key};
pub use models::{FetchOptions, QueryType, RequestBody, RequestDescriptor};
pub use net::{ResolveMode, ResponseBody};
pub use store::{CacheStore, MemoryCache};
