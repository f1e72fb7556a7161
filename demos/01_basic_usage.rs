use cached_fetch::{CacheConfig, CachedFetch, FetchOptions, RequestDescriptor, RetryConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    cached_fetch::init_tracing();

    // 1. A client whose cache misses are retried up to three times.
    let client = CachedFetch::builder()
        .timeout(Duration::from_secs(10))
        .cache_config(CacheConfig::new().retry(RetryConfig::new(3, Duration::from_secs(1))))
        .build()?;

    // 2. The first read goes to the network, the second is served from memory.
    let req = RequestDescriptor::parse("https://jsonplaceholder.typicode.com/todos/1")?;
    let first = client.fetch(&req, &FetchOptions::fetch()).await?;
    let second = client.fetch(&req, &FetchOptions::fetch()).await?;
    println!("same body from cache: {}", first == second);
    println!("cached keys: {:?}", client.cached_keys());

    // 3. A write never touches the cache.
    let created: serde_json::Value = client
        .request(
            reqwest::Method::POST,
            url::Url::parse("https://jsonplaceholder.typicode.com/todos")?,
        )
        .json_body(&serde_json::json!({ "title": "try cached-fetch", "completed": false }))?
        .mutate()
        .json()
        .await?;
    println!("created: {created}");

    Ok(())
}
