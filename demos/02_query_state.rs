use cached_fetch::{CachedFetch, Query, RequestDescriptor};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = CachedFetch::default();
    let req = RequestDescriptor::parse("https://jsonplaceholder.typicode.com/users/1")?;

    let mut query: Query<User> = Query::new(&client, req)
        .on_error(|e| eprintln!("load failed: {e}"));

    let state = query.run().await;
    if let Some(user) = &state.data {
        println!("#{} {}", user.id, user.name);
    }

    // Ignore the cache and reload.
    let state = query.refetch().await;
    println!("error after refetch: {}", state.is_error);

    Ok(())
}
