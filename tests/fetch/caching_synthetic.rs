use cached_fetch::{
    CacheConfig, CacheStore, CachedFetch, FetchOptions, MemoryCache, RequestBody, ResponseBody,
};
use futures::future::join;
use httpmock::Method::{GET, POST};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn fetch_serves_from_cache_on_second_call() {
    let server = crate::common::setup_server();

    // This mock only expects to be called ONCE.
    let mock = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id":1,"name":"alpha"}"#);
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/a");

    let first = client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(1);

    let second = client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(1);

    assert_eq!(first, ResponseBody::Json(json!({"id": 1, "name": "alpha"})));
    assert_eq!(first, second);
}

#[tokio::test]
async fn fetch_stores_body_under_method_and_url_key() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/a");
        then.status(200).body(r#"[1,2,3]"#);
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/a");
    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert();

    let key = format!("GET-{}", server.url("/a"));
    assert_eq!(client.cached_keys(), vec![key.clone()]);
    assert_eq!(
        client.get_cached_data(&key),
        Some(ResponseBody::Json(json!([1, 2, 3])))
    );
}

#[tokio::test]
async fn expired_entry_forces_network_call() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/short");
        then.status(200).body(r#"{"ok":true}"#);
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/short");
    let opts = FetchOptions::fetch()
        .cache_config(CacheConfig::new().cache_valid_for(Duration::from_millis(100)));

    client.fetch(&req, &opts).await.unwrap();
    client.fetch(&req, &opts).await.unwrap();
    mock.assert_calls(1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    client.fetch(&req, &opts).await.unwrap();
    mock.assert_calls(2);
}

#[tokio::test]
async fn skip_cache_neither_reads_nor_writes() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/live");
        then.status(200).body(r#"{"tick":1}"#);
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/live");
    let opts = FetchOptions::fetch().cache_config(CacheConfig::new().skip_cache(true));

    client.fetch(&req, &opts).await.unwrap();
    client.fetch(&req, &opts).await.unwrap();
    mock.assert_calls(2);
    assert!(client.cached_keys().is_empty());
}

#[tokio::test]
async fn skip_cache_from_instance_defaults_applies_to_every_call() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/nocache");
        then.status(200).body("{}");
    });

    let client = crate::common::client_with(CacheConfig::new().skip_cache(true));
    let req = crate::common::get(&server, "/nocache");

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(2);

    // A per-call override turns caching back on.
    let opts = FetchOptions::fetch().cache_config(CacheConfig::new().skip_cache(false));
    client.fetch(&req, &opts).await.unwrap();
    client.fetch(&req, &opts).await.unwrap();
    mock.assert_calls(3);
}

#[tokio::test]
async fn different_bodies_are_cached_separately() {
    let server = crate::common::setup_server();
    let apples = server.mock(|when, then| {
        when.method(POST).path("/search").json_body(json!({"q": "apples"}));
        then.status(200).body(r#"{"hits":3}"#);
    });
    let pears = server.mock(|when, then| {
        when.method(POST).path("/search").json_body(json!({"q": "pears"}));
        then.status(200).body(r#"{"hits":5}"#);
    });

    let client = crate::common::client();
    let base = crate::common::get(&server, "/search").with_method(reqwest::Method::POST);
    let a = base.clone().with_body(RequestBody::Json(json!({"q": "apples"})));
    let p = base.with_body(RequestBody::Json(json!({"q": "pears"})));

    let ra = client.fetch(&a, &FetchOptions::fetch()).await.unwrap();
    let rp = client.fetch(&p, &FetchOptions::fetch()).await.unwrap();
    let ra2 = client.fetch(&a, &FetchOptions::fetch()).await.unwrap();

    apples.assert_calls(1);
    pears.assert_calls(1);
    assert_eq!(ra, ra2);
    assert_ne!(ra, rp);
    assert_eq!(client.cached_keys().len(), 2);
}

#[tokio::test]
async fn concurrent_identical_misses_both_hit_the_network() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_millis(100))
            .body(r#"{"v":1}"#);
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/slow");
    let opts = FetchOptions::fetch();

    let (a, b) = join(client.fetch(&req, &opts), client.fetch(&req, &opts)).await;
    assert_eq!(a.unwrap(), b.unwrap());
    mock.assert_calls(2);
    assert_eq!(client.cached_keys().len(), 1);
}

#[tokio::test]
async fn clones_share_one_cache_but_instances_do_not() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/shared");
        then.status(200).body("{}");
    });

    let client = crate::common::client();
    let clone = client.clone();
    let other = crate::common::client();
    let req = crate::common::get(&server, "/shared");

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    clone.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(1);

    other.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(2);
}

#[tokio::test]
async fn invalidate_and_clear_drop_entries() {
    let server = crate::common::setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/inv");
        then.status(200).body("{}");
    });

    let client = crate::common::client();
    let req = crate::common::get(&server, "/inv");
    let key = format!("GET-{}", server.url("/inv"));

    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    client.invalidate(&key);
    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();
    mock.assert_calls(2);

    client.clear_cache();
    assert!(client.cached_keys().is_empty());
}

#[tokio::test]
async fn custom_store_receives_writes() {
    let server = crate::common::setup_server();
    let _mock = server.mock(|when, then| {
        when.method(GET).path("/store");
        then.status(200).body(r#""hello""#);
    });

    let store = Arc::new(MemoryCache::new());
    let client = CachedFetch::builder()
        .cache_store(store.clone())
        .build()
        .unwrap();
    let req = crate::common::get(&server, "/store");
    client.fetch(&req, &FetchOptions::fetch()).await.unwrap();

    let key = format!("GET-{}", server.url("/store"));
    assert_eq!(store.get(&key), Some(ResponseBody::Json(json!("hello"))));
}
