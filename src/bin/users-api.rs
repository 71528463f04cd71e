//! Users API server.
//!
//! Reads configuration from the environment (see [`users_api::config`]),
//! prepares the in-memory document store and serves `PATCH /users/{userId}`.
//!
//! Usage: `USERS_API_SEED_FILE=users.json RUST_LOG=debug users-api`

use users_api::store::{DocumentStore, InMemoryDocumentStore};
use users_api::{ServiceConfig, UpdateUserHandler, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = ServiceConfig::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);

    let store = InMemoryDocumentStore::from_config(&config.store);
    store.initialize().await?;
    let stats = store.stats().await;
    log::info!(
        "Document store ready: {} documents in {} partitions",
        stats.document_count,
        stats.partition_count
    );

    let app = routes::router(UpdateUserHandler::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
