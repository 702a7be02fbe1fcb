use std::sync::Arc;

use gatehouse_auth::{TokenSigner, UsersRegistry};
use gatehouse_store::JournalStore;

#[tokio::main]
async fn main() {
    gatehouse_observability::init();

    let secret = std::env::var("GATEHOUSE_SECRET").unwrap_or_else(|_| {
        tracing::warn!("GATEHOUSE_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let salt = std::env::var("GATEHOUSE_SALT").unwrap_or_else(|_| {
        tracing::warn!("GATEHOUSE_SALT not set; using insecure dev default");
        "dev-salt".to_string()
    });
    let journal =
        std::env::var("GATEHOUSE_JOURNAL").unwrap_or_else(|_| "users.journal".to_string());
    let addr = std::env::var("GATEHOUSE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let storage = Arc::new(JournalStore::open(&journal, salt).expect("failed to open journal"));

    let signer = TokenSigner::new(&secret);
    let registry = Arc::new(UsersRegistry::new(storage, signer.clone()));

    let app = gatehouse_api::build_app(registry, Arc::new(signer));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
