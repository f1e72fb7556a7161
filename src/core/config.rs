//! Cache policy: partial overrides and their resolution into an effective policy.

use crate::core::client::RetryConfig;
use crate::core::key::{KeyGenerator, default_key_generator};
use crate::core::RequestDescriptor;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A partial cache policy. Unset fields fall back to the layer below.
#[derive(Clone, Default)]
pub struct CacheConfig {
    /// Go straight to the network without reading or writing the cache.
    pub skip_cache: Option<bool>,
    /// How long a stored body stays usable.
    pub cache_valid_for: Option<Duration>,
    /// Replaces the canonical key derivation.
    pub generate_cache_key: Option<KeyGenerator>,
    /// Retry policy applied on a cache miss.
    pub retry: Option<RetryConfig>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = Some(skip);
        self
    }

    #[must_use]
    pub const fn cache_valid_for(mut self, dur: Duration) -> Self {
        self.cache_valid_for = Some(dur);
        self
    }

    #[must_use]
    pub fn key_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> String + Send + Sync + 'static,
    {
        self.generate_cache_key = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("skip_cache", &self.skip_cache)
            .field("cache_valid_for", &self.cache_valid_for)
            .field(
                "generate_cache_key",
                &self.generate_cache_key.as_ref().map(|_| "<custom>"),
            )
            .field("retry", &self.retry)
            .finish()
    }
}

/// A fully resolved cache policy for one call.
#[derive(Clone)]
pub struct EffectiveCacheConfig {
    pub cache_valid_for: Duration,
    pub generate_cache_key: KeyGenerator,
    pub retry: Option<RetryConfig>,
    pub skip_cache: bool,
}

impl EffectiveCacheConfig {
    /// The bottom layer: canonical keys, `validity`, no retry, cache enabled.
    pub fn fallback(validity: Duration) -> Self {
        Self {
            cache_valid_for: validity,
            generate_cache_key: default_key_generator(),
            retry: None,
            skip_cache: false,
        }
    }

    /// Derive the key for `request` with this policy's generator.
    pub fn cache_key(&self, request: &RequestDescriptor) -> String {
        (self.generate_cache_key)(request)
    }
}

impl fmt::Debug for EffectiveCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveCacheConfig")
            .field("cache_valid_for", &self.cache_valid_for)
            .field("retry", &self.retry)
            .field("skip_cache", &self.skip_cache)
            .finish_non_exhaustive()
    }
}

/// Layer `overrides` onto `base`.
///
/// `cache_valid_for` and `generate_cache_key` are always reset to `default_validity`
/// and the canonical generator before `overrides` is applied, so whatever `base`
/// carries for those two fields never reaches the result. Only an explicit override
/// changes them. `retry` and `skip_cache` are inherited from `base` when not overridden.
pub fn resolve(
    base: &EffectiveCacheConfig,
    default_validity: Duration,
    overrides: &CacheConfig,
) -> EffectiveCacheConfig {
    EffectiveCacheConfig {
        cache_valid_for: overrides.cache_valid_for.unwrap_or(default_validity),
        generate_cache_key: overrides
            .generate_cache_key
            .clone()
            .unwrap_or_else(default_key_generator),
        retry: overrides.retry.or(base.retry),
        skip_cache: overrides.skip_cache.unwrap_or(base.skip_cache),
    }
}
