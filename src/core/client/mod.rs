//! Public client surface + builder.
//! Internals are split into `retry` (constant-delay retry loop) and `constants` (UA + defaults).

mod constants;
mod retry;

pub use constants::{DEFAULT_CACHE_VALIDITY, MIN_RETRY_DELAY};
pub use retry::{RetryConfig, with_retry};

use crate::core::config::{self, CacheConfig, EffectiveCacheConfig};
use crate::core::store::{CacheStore, MemoryCache};
use crate::core::{FetchError, FetchOptions, QueryType, RequestDescriptor, ResponseBody, net};
use crate::fetch::FetchBuilder;
use constants::USER_AGENT;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug)]
struct Shared {
    defaults: RwLock<EffectiveCacheConfig>,
    default_validity: Duration,
    cache: Arc<dyn CacheStore>,
    legacy_double_fetch: bool,
}

/// A request layer that caches `fetch` responses and retries failed cache misses.
///
/// Cloning is cheap: clones share the HTTP client, the instance defaults, and the
/// cache store.
///
/// ```no_run
/// # use cached_fetch::{CachedFetch, FetchOptions, RequestDescriptor};
/// # #[tokio::main]
/// # async fn main() -> Result<(), cached_fetch::FetchError> {
/// let client = CachedFetch::default();
/// let req = RequestDescriptor::parse("https://example.com/items")?;
/// let first = client.fetch(&req, &FetchOptions::fetch()).await?;
/// // Served from memory for the next five minutes.
/// let second = client.fetch(&req, &FetchOptions::fetch()).await?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CachedFetch {
    http: Client,
    shared: Arc<Shared>,
}

impl Default for CachedFetch {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl CachedFetch {
    /// Create a new builder.
    pub fn builder() -> CachedFetchBuilder {
        CachedFetchBuilder::default()
    }

    /// Fetch `request`, serving it from the cache when allowed and fresh.
    ///
    /// - `QueryType::Mutate` calls and calls whose effective policy sets `skip_cache`
    ///   make exactly one network call and never touch the cache.
    /// - Otherwise a fresh cached body is returned without any network call.
    /// - On a miss the body is fetched, stored for the effective validity, and returned.
    ///
    /// When a retry policy is in effect, a miss first runs the retrying call and then
    /// issues one more plain call whose body is the one stored and returned. Build the
    /// client with [`CachedFetchBuilder::legacy_double_fetch`]`(false)` to store the
    /// retried body instead.
    ///
    /// # Errors
    ///
    /// Any transport or status failure is returned unchanged. Nothing is cached on failure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            skip(self, request, options),
            err,
            fields(method = %request.method, url = %request.url, query_type = options.query_type.as_str())
        )
    )]
    pub async fn fetch(
        &self,
        request: &RequestDescriptor,
        options: &FetchOptions,
    ) -> Result<ResponseBody, FetchError> {
        let cfg = self.update_cache_config(&options.cache_config).await;

        if options.query_type == QueryType::Mutate || cfg.skip_cache {
            #[cfg(feature = "tracing")]
            tracing::debug!("cache bypassed");
            return net::execute(&self.http, request, options).await;
        }

        let key = cfg.cache_key(request);
        if let Some(hit) = self.shared.cache.get(&key) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%key, "cache hit");
            return Ok(hit);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%key, "cache miss");

        let mut retried = None;
        if let Some(retry) = &cfg.retry {
            retried = Some(
                with_retry(retry, || net::execute(&self.http, request, options)).await?,
            );
        }

        let body = match retried {
            Some(body) if !self.shared.legacy_double_fetch => body,
            _ => net::execute(&self.http, request, options).await?,
        };

        self.shared
            .cache
            .put(&key, body.clone(), cfg.cache_valid_for);
        #[cfg(feature = "tracing")]
        tracing::debug!(%key, valid_for = ?cfg.cache_valid_for, "cached");

        Ok(body)
    }

    /// Start a per-request builder for `method` on `url`.
    pub fn request(&self, method: Method, url: Url) -> FetchBuilder {
        FetchBuilder::new(self, url).method(method)
    }

    /// Start a `GET` builder for `url`.
    pub fn get(&self, url: Url) -> FetchBuilder {
        FetchBuilder::new(self, url)
    }

    /// Resolve `overrides` against the instance defaults without storing the result.
    ///
    /// Validity and key derivation always start from the instance's default validity
    /// and the canonical generator; only `overrides` can change them.
    pub async fn update_cache_config(&self, overrides: &CacheConfig) -> EffectiveCacheConfig {
        let base = self.shared.defaults.read().await;
        config::resolve(&base, self.shared.default_validity, overrides)
    }

    /// Resolve `overrides` against the instance defaults and keep the result as the
    /// new defaults.
    pub async fn set_cache_defaults(&self, overrides: &CacheConfig) -> EffectiveCacheConfig {
        let mut base = self.shared.defaults.write().await;
        let next = config::resolve(&base, self.shared.default_validity, overrides);
        *base = next.clone();
        next
    }

    /// A snapshot of the current instance defaults.
    pub async fn cache_defaults(&self) -> EffectiveCacheConfig {
        self.shared.defaults.read().await.clone()
    }

    /// Keys currently held by the cache store.
    pub fn cached_keys(&self) -> Vec<String> {
        self.shared.cache.keys()
    }

    /// The cached body for `key`, if present and fresh.
    pub fn get_cached_data(&self, key: &str) -> Option<ResponseBody> {
        self.shared.cache.get(key)
    }

    /// Drop a single cached entry.
    pub fn invalidate(&self, key: &str) {
        self.shared.cache.remove(key);
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        self.shared.cache.clear();
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct CachedFetchBuilder {
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    proxy: Option<String>,
    custom_client: Option<Client>,

    cache_config: CacheConfig,
    default_validity: Option<Duration>,
    cache_store: Option<Arc<dyn CacheStore>>,
    legacy_double_fetch: Option<bool>,
}

impl CachedFetchBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Route all traffic through `proxy_url`.
    #[must_use]
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Use a preconfigured `reqwest` client. UA, timeout and proxy settings on this
    /// builder are then ignored.
    #[must_use]
    pub fn custom_client(mut self, client: Client) -> Self {
        self.custom_client = Some(client);
        self
    }

    /// Instance-level cache policy applied under every call's overrides.
    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.cache_config = cfg;
        self
    }

    /// The validity every resolution starts from. Default: five minutes.
    #[must_use]
    pub const fn default_cache_validity(mut self, dur: Duration) -> Self {
        self.default_validity = Some(dur);
        self
    }

    /// Replace the in-memory store.
    #[must_use]
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    /// Whether a retry-enabled cache miss makes one extra plain call after the retry
    /// loop and stores that body. Default: `true`.
    #[must_use]
    pub const fn legacy_double_fetch(mut self, on: bool) -> Self {
        self.legacy_double_fetch = Some(on);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the proxy URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<CachedFetch, FetchError> {
        let http = match self.custom_client {
            Some(c) => c,
            None => {
                let mut httpb = Client::builder()
                    .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
                if let Some(t) = self.timeout {
                    httpb = httpb.timeout(t);
                }
                if let Some(ct) = self.connect_timeout {
                    httpb = httpb.connect_timeout(ct);
                }
                if let Some(p) = &self.proxy {
                    httpb = httpb.proxy(reqwest::Proxy::all(p)?);
                }
                httpb.build()?
            }
        };

        let default_validity = self.default_validity.unwrap_or(DEFAULT_CACHE_VALIDITY);
        let defaults = config::resolve(
            &EffectiveCacheConfig::fallback(default_validity),
            default_validity,
            &self.cache_config,
        );

        Ok(CachedFetch {
            http,
            shared: Arc::new(Shared {
                defaults: RwLock::new(defaults),
                default_validity,
                cache: self
                    .cache_store
                    .unwrap_or_else(|| Arc::new(MemoryCache::new())),
                legacy_double_fetch: self.legacy_double_fetch.unwrap_or(true),
            }),
        })
    }
}
