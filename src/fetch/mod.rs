//! Per-request builder on top of [`CachedFetch::fetch`].

use crate::core::{
    CacheConfig, CachedFetch, FetchError, FetchOptions, QueryType, RequestBody,
    RequestDescriptor, ResolveMode, ResponseBody, RetryConfig,
};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A builder for a single cached (or mutating) request.
///
/// ```no_run
/// # use cached_fetch::{CachedFetch, FetchBuilder};
/// # #[tokio::main]
/// # async fn main() -> Result<(), cached_fetch::FetchError> {
/// let client = CachedFetch::default();
/// let url = url::Url::parse("https://example.com/search")?;
/// let hits: Vec<String> = FetchBuilder::new(&client, url)
///     .method(reqwest::Method::POST)
///     .json_body(&serde_json::json!({ "q": "rust" }))?
///     .json()
///     .await?;
/// # let _ = hits;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct FetchBuilder {
    #[doc(hidden)]
    pub(crate) client: CachedFetch,
    #[doc(hidden)]
    pub(crate) request: RequestDescriptor,
    #[doc(hidden)]
    pub(crate) options: FetchOptions,
}

impl FetchBuilder {
    /// Creates a new `GET` builder for `url`.
    pub fn new(client: &CachedFetch, url: Url) -> Self {
        Self {
            client: client.clone(),
            request: RequestDescriptor::new(url),
            options: FetchOptions::default(),
        }
    }

    /// Sets the HTTP method. (Default: `GET`)
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    /// Sends `body` verbatim.
    #[must_use]
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.request.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Sends `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Json`] if `body` cannot be represented as JSON.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, FetchError> {
        self.request.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Adds a header forwarded to the transport.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.options.headers.insert(name, value);
        self
    }

    /// Sets a timeout for this request only.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.options.timeout = Some(dur);
        self
    }

    /// Marks this request as a read or a write. (Default: `QueryType::Fetch`)
    #[must_use]
    pub const fn query_type(mut self, qt: QueryType) -> Self {
        self.options.query_type = qt;
        self
    }

    /// Shorthand for `query_type(QueryType::Mutate)`.
    #[must_use]
    pub const fn mutate(self) -> Self {
        self.query_type(QueryType::Mutate)
    }

    /// Replaces the cache overrides for this request.
    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.options.cache_config = cfg;
        self
    }

    /// Skips the cache for this request.
    #[must_use]
    pub const fn skip_cache(mut self, skip: bool) -> Self {
        self.options.cache_config.skip_cache = Some(skip);
        self
    }

    /// How long the response stays cached.
    #[must_use]
    pub const fn cache_valid_for(mut self, dur: Duration) -> Self {
        self.options.cache_config.cache_valid_for = Some(dur);
        self
    }

    /// Overrides the retry policy for this request.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.options.cache_config.retry = Some(retry);
        self
    }

    /// Sets how the response body is decoded. (Default: `ResolveMode::Json`)
    #[must_use]
    pub const fn resolve(mut self, mode: ResolveMode) -> Self {
        self.options.resolve = mode;
        self
    }

    /// The request this builder will send.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.request
    }

    /// The cache key this request resolves to under the client's current policy.
    pub async fn cache_key(&self) -> String {
        self.client
            .update_cache_config(&self.options.cache_config)
            .await
            .cache_key(&self.request)
    }

    /// Sends the request and returns the decoded body.
    ///
    /// # Errors
    ///
    /// See [`CachedFetch::fetch`].
    pub async fn send(self) -> Result<ResponseBody, FetchError> {
        self.client.fetch(&self.request, &self.options).await
    }

    /// Sends the request as JSON and deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Transport and status failures as for [`send`](Self::send), plus
    /// [`FetchError::Json`] when the body does not match `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, FetchError> {
        self.resolve(ResolveMode::Json).send().await?.into_json()
    }

    /// Sends the request and returns the body as text.
    ///
    /// # Errors
    ///
    /// See [`CachedFetch::fetch`].
    pub async fn text(self) -> Result<String, FetchError> {
        match self.resolve(ResolveMode::Text).send().await? {
            ResponseBody::Text(s) => Ok(s),
            other => Err(FetchError::Data(format!(
                "expected a text body, got {}",
                other.mode().as_str()
            ))),
        }
    }
}
