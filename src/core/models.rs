use crate::core::{CacheConfig, ResolveMode};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The identity of a single request: where it goes, how, and with what payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// The target resource.
    pub url: Url,
    /// The HTTP method. Defaults to `GET`.
    pub method: Method,
    /// The request payload, if any.
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    /// A body-less `GET` for `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            body: None,
        }
    }

    /// Parse `url` and build a body-less `GET` for it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Url`](crate::FetchError::Url) if `url` is not a valid absolute URL.
    pub fn parse(url: &str) -> Result<Self, crate::FetchError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Replace the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the payload.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// A request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent and keyed verbatim.
    Text(String),
    /// Sent as `application/json`; keyed by its compact serialization.
    Json(serde_json::Value),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Text(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Text(s.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(v: serde_json::Value) -> Self {
        RequestBody::Json(v)
    }
}

/// Whether a call reads data or changes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// May be served from and written to the cache. (Default)
    #[default]
    Fetch,
    /// Always goes to the network; never reads or writes the cache.
    Mutate,
}

impl QueryType {
    /// The wire name of the query type.
    pub const fn as_str(self) -> &'static str {
        match self {
            QueryType::Fetch => "fetch",
            QueryType::Mutate => "mutate",
        }
    }
}

/// Per-call options accepted by [`CachedFetch::fetch`](crate::CachedFetch::fetch).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Read or write classification of the call.
    pub query_type: QueryType,
    /// Cache policy overrides for this call only.
    pub cache_config: CacheConfig,
    /// How a successful body is decoded.
    pub resolve: ResolveMode,
    /// Extra headers forwarded to the transport as-is.
    pub headers: HeaderMap,
    /// Per-request transport timeout.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Options for a cacheable read.
    pub fn fetch() -> Self {
        Self::default()
    }

    /// Options for a state-changing call that bypasses the cache.
    pub fn mutate() -> Self {
        Self {
            query_type: QueryType::Mutate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.cache_config = cfg;
        self
    }

    #[must_use]
    pub const fn resolve(mut self, mode: ResolveMode) -> Self {
        self.resolve = mode;
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }
}
