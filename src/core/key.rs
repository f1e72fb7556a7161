//! Cache key derivation.

use crate::core::{RequestBody, RequestDescriptor};
use std::sync::Arc;

/// Separator placed between key tokens.
pub const KEY_SEPARATOR: &str = "-";

/// A function deriving a cache key from a request.
pub type KeyGenerator = Arc<dyn Fn(&RequestDescriptor) -> String + Send + Sync>;

/// Derive the canonical cache key for `request`.
///
/// Tokens, in order: the method, the URL, then the body (verbatim text, or compact
/// JSON). An absent body contributes no token. Tokens are joined with [`KEY_SEPARATOR`].
///
/// ```
/// # use cached_fetch::{RequestDescriptor, generate_cache_key};
/// let req = RequestDescriptor::parse("https://x/a").unwrap();
/// assert_eq!(generate_cache_key(&req), "GET-https://x/a");
/// ```
pub fn generate_cache_key(request: &RequestDescriptor) -> String {
    let mut tokens: Vec<String> = Vec::with_capacity(3);
    tokens.push(request.method.as_str().to_string());
    tokens.push(request.url.as_str().to_string());
    match &request.body {
        Some(RequestBody::Text(s)) => tokens.push(s.clone()),
        Some(RequestBody::Json(v)) => tokens.push(v.to_string()),
        None => {}
    }
    tokens.join(KEY_SEPARATOR)
}

/// The canonical generator as a [`KeyGenerator`].
pub fn default_key_generator() -> KeyGenerator {
    Arc::new(generate_cache_key)
}
