//! A stateful, re-runnable read with loading/error tracking.
//!
//! `Query` is the view-layer side of the request layer with the view layer removed:
//! it remembers the outcome of its last run so a UI (or anything else) can poll
//! `state()` instead of juggling results.

use crate::core::{
    CacheConfig, CachedFetch, FetchError, FetchOptions, QueryType, RequestDescriptor,
    ResponseBody,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

type Transform<T> = Arc<dyn Fn(ResponseBody) -> Result<T, FetchError> + Send + Sync>;
type SuccessHook = Arc<dyn Fn(&ResponseBody) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// The observable state of a [`Query`].
#[derive(Debug)]
pub struct QueryState<T> {
    /// Set while a run is in flight and no data has been loaded yet.
    pub is_loading: bool,
    /// Set while any run is in flight.
    pub is_fetching: bool,
    /// Whether the last completed run failed.
    pub is_error: bool,
    /// Whether the query has been run at least once.
    pub is_initialized: bool,
    /// The last successfully loaded value. Kept across failed runs.
    pub data: Option<T>,
    /// The failure of the last run, cleared by the next success.
    pub error: Option<FetchError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_fetching: false,
            is_error: false,
            is_initialized: false,
            data: None,
            error: None,
        }
    }
}

/// A cached read whose outcome is tracked in a [`QueryState`].
///
/// [`run`](Self::run) may be answered from the cache; [`refetch`](Self::refetch)
/// always goes to the network.
pub struct Query<T> {
    client: CachedFetch,
    request: RequestDescriptor,
    options: FetchOptions,
    transform: Transform<T>,
    on_success: Option<SuccessHook>,
    on_error: Option<ErrorHook>,
    state: QueryState<T>,
}

impl<T: DeserializeOwned + 'static> Query<T> {
    /// A query whose JSON body is deserialized into `T`.
    pub fn new(client: &CachedFetch, request: RequestDescriptor) -> Self {
        Self::with_transform(client, request, ResponseBody::into_json::<T>)
    }
}

impl<T> Query<T> {
    /// A query whose body is turned into `T` by `transform`.
    pub fn with_transform<F>(client: &CachedFetch, request: RequestDescriptor, transform: F) -> Self
    where
        F: Fn(ResponseBody) -> Result<T, FetchError> + Send + Sync + 'static,
    {
        Self {
            client: client.clone(),
            request,
            options: FetchOptions::fetch(),
            transform: Arc::new(transform),
            on_success: None,
            on_error: None,
            state: QueryState::default(),
        }
    }

    /// Replaces the fetch options. The query type is always forced to `Fetch`.
    #[must_use]
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the cache overrides. `skip_cache` is decided per run.
    #[must_use]
    pub fn cache_config(mut self, cfg: CacheConfig) -> Self {
        self.options.cache_config = cfg;
        self
    }

    /// Called with the raw body after every successful run.
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResponseBody) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    /// Called with the failure after every failed run.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&FetchError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.state.error.as_ref()
    }

    /// Run the query, using a fresh cached body if there is one.
    pub async fn run(&mut self) -> &QueryState<T> {
        self.execute(false).await
    }

    /// Run the query against the network, ignoring any cached body.
    pub async fn refetch(&mut self) -> &QueryState<T> {
        self.execute(true).await
    }

    async fn execute(&mut self, skip_cache: bool) -> &QueryState<T> {
        self.state.is_initialized = true;
        self.state.is_loading = self.state.data.is_none();
        self.state.is_fetching = true;

        let mut options = self.options.clone();
        options.query_type = QueryType::Fetch;
        options.cache_config.skip_cache = Some(skip_cache);

        let outcome = match self.client.fetch(&self.request, &options).await {
            Ok(body) => {
                let transformed = (self.transform)(body.clone());
                transformed.map(|value| (body, value))
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((body, value)) => {
                self.state.error = None;
                self.state.is_error = false;
                self.state.data = Some(value);
                if let Some(hook) = &self.on_success {
                    hook(&body);
                }
            }
            Err(e) => {
                self.state.is_error = true;
                if let Some(hook) = &self.on_error {
                    hook(&e);
                }
                self.state.error = Some(e);
            }
        }

        self.state.is_loading = false;
        self.state.is_fetching = false;
        &self.state
    }
}

impl<T: fmt::Debug> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("request", &self.request)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
