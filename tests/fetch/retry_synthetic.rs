use cached_fetch::{CacheConfig, CachedFetch, FetchError, FetchOptions, RetryConfig};
use httpmock::Method::GET;
use std::time::Duration;

#[tokio::test]
async fn fetch_retries_on_persistent_5xx_then_surfaces_last_failure() {
    let server = crate::common::setup_server();

    // This single mock will persistently fail, allowing us to count the retries.
    let fail_mock = server.mock(|when, then| {
        when.method(GET).path("/unstable");
        then.status(503).body("Service Unavailable");
    });

    let attempts = 1;
    // Below the floor; the wait is raised to one second.
    let client = crate::common::client_with(
        CacheConfig::new().retry(RetryConfig::new(attempts, Duration::from_millis(1))),
    );
    let req = crate::common::get(&server, "/unstable");

    let started = std::time::Instant::now();
    let result = client.fetch(&req, &FetchOptions::fetch()).await;

    // The mock should be hit 1 (initial) + 1 (retry) times; the retry loop fails
    // before the plain follow-up call is reached.
    fail_mock.assert_calls((1 + attempts) as usize);
    assert!(started.elapsed() >= Duration::from_millis(1000));

    match result {
        Err(FetchError::Status { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body.as_deref(), Some("Service Unavailable"));
        }
        other => panic!("Expected a Status error after all retries failed, got {other:?}"),
    }
    assert!(client.cached_keys().is_empty());
}

#[tokio::test]
async fn retry_configured_miss_issues_a_second_plain_call() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/twice");
        then.status(200).body(r#"{"v":1}"#);
    });

    let client = crate::common::client_with(CacheConfig::new().retry(RetryConfig::default()));
    let req = crate::common::get(&server, "/twice");

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    // One call from the retry loop, one plain call whose body is cached.
    mock.assert_calls(2);

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(2);
}

#[tokio::test]
async fn legacy_double_fetch_off_caches_the_retried_body() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/once");
        then.status(200).body(r#"{"v":1}"#);
    });

    let client = CachedFetch::builder()
        .cache_config(CacheConfig::new().retry(RetryConfig::default()))
        .legacy_double_fetch(false)
        .build()
        .unwrap();
    let req = crate::common::get(&server, "/once");

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(1);
    assert_eq!(client.cached_keys().len(), 1);
}

#[tokio::test]
async fn per_call_retry_override_applies_to_that_call_only() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/override");
        then.status(200).body("{}");
    });

    let client = crate::common::client();
    let plain = crate::common::get(&server, "/override");
    let opts = FetchOptions::fetch()
        .cache_config(CacheConfig::new().skip_cache(true));

    // No retry policy: one call.
    client.fetch(&plain, &opts).await.unwrap();
    mock.assert_calls(1);

    // Retry policy on a cache miss: retry loop + plain call.
    let with_retry = FetchOptions::fetch()
        .cache_config(CacheConfig::new().retry(RetryConfig::new(2, Duration::ZERO)));
    client.fetch(&plain, &with_retry).await.unwrap();
    mock.assert_calls(3);
}

#[tokio::test]
async fn legacy_second_call_failure_is_returned_and_nothing_is_cached() {
    let server = crate::common::ScriptedServer::start(vec![
        crate::common::http_response(200, r#"{"v":1}"#),
        crate::common::http_response(503, "Service Unavailable"),
    ])
    .await;

    let client =
        crate::common::client_with(CacheConfig::new().retry(RetryConfig::new(1, Duration::ZERO)));
    let req = server.get("/flaky");

    let result = client.fetch(&req, &FetchOptions::fetch()).await;

    // The retry loop succeeded on its first call; the plain follow-up failed.
    assert_eq!(server.hits(), 2);
    match result {
        Err(FetchError::Status { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body.as_deref(), Some("Service Unavailable"));
        }
        other => panic!("expected the follow-up call's Status error, got {other:?}"),
    }
    assert!(client.cached_keys().is_empty());
}
