//! Centralized defaults for the client and its cache policy.

use std::time::Duration;

/// Default UA sent when none is configured.
pub(crate) const USER_AGENT: &str = concat!("cached-fetch/", env!("CARGO_PKG_VERSION"));

/// How long a cached body stays usable unless a call says otherwise.
pub const DEFAULT_CACHE_VALIDITY: Duration = Duration::from_secs(5 * 60);

/// Floor applied to every configured retry delay.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(1000);
