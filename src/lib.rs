//! cached-fetch: an async HTTP request layer with response caching and retries.
//!
//! Reads (`QueryType::Fetch`) are keyed by method, URL and body and served from an
//! in-memory store while fresh. Writes (`QueryType::Mutate`) always go to the network.
//! Cache misses can be retried with a constant delay.
//!
//! ```no_run
//! # use cached_fetch::{CachedFetch, CacheConfig, RetryConfig};
//! # use std::time::Duration;
//! # #[tokio::main]
//! # async fn main() -> Result<(), cached_fetch::FetchError> {
//! let client = CachedFetch::builder()
//!     .cache_config(CacheConfig::new().retry(RetryConfig::new(3, Duration::from_secs(1))))
//!     .build()?;
//!
//! let todo: serde_json::Value = client
//!     .get(url::Url::parse("https://example.com/todos/1")?)
//!     .json()
//!     .await?;
//! # let _ = todo;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod fetch;
pub mod query;

pub use crate::core::{
    CacheConfig, CacheStore, CachedFetch, CachedFetchBuilder, EffectiveCacheConfig, FetchError,
    FetchOptions, KeyGenerator, MemoryCache, QueryType, RequestBody, RequestDescriptor,
    ResolveMode, ResponseBody, RetryConfig, generate_cache_key,
};
pub use fetch::FetchBuilder;
pub use query::{Query, QueryState};

/// Install an `env-filter` + `fmt` subscriber. Honors `RUST_LOG`.
///
/// Intended for demos and tests; calling it twice is harmless.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
