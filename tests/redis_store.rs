//! Integration tests against a live Redis.
//!
//! Ignored by default; run with `cargo test -- --ignored` and a Redis at
//! `REDIS_HOST`/`REDIS_PORT` (default 127.0.0.1:6379).

use ecdsa_session::{
    AuthService, KeyTtl, RedisStore, SessionConfig, SessionManager, SessionStore, SignedRequest,
    StoreConfig,
};
use std::time::Duration;

const ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
const MESSAGE: &str = "Some data";
const SIGNATURE: &str = "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c";

fn store_config() -> StoreConfig {
    StoreConfig {
        host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: std::env::var("REDIS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(6379),
        ..StoreConfig::default()
    }
}

async fn connect() -> RedisStore {
    RedisStore::connect(&store_config())
        .await
        .expect("Failed to connect to Redis")
}

#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_session_lifecycle() {
    let auth_service = AuthService::new(SessionManager::new(connect().await, SessionConfig::default()));

    let session = auth_service
        .start(&SignedRequest::new(ADDRESS, MESSAGE, SIGNATURE))
        .await
        .unwrap();
    assert_eq!(session.expiry - session.start, 86_400_000);

    let status = auth_service.lookup(&session.id).await.unwrap().unwrap();
    assert_eq!(status.session, session);
    assert!(status.remaining_ms <= 86_400_000);
    assert!(status.remaining_ms > 86_390_000);

    auth_service.revoke(&session.id).await.unwrap();
    auth_service.revoke(&session.id).await.unwrap();
    assert!(auth_service.lookup(&session.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_ttl_expiry_is_enforced_by_redis() {
    let config = SessionConfig {
        duration_ms: 200,
        key_prefix: "session-it".to_string(),
    };
    let sessions = SessionManager::new(connect().await, config);
    let session = sessions.create(ADDRESS).await.unwrap();

    let key = format!("session-it:{}", session.id);
    assert!(matches!(
        sessions.store().ttl(&key).await.unwrap(),
        KeyTtl::Expiring(ms) if ms <= 200
    ));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(sessions.get(&session.id).await.unwrap().is_none());
    assert_eq!(sessions.store().ttl(&key).await.unwrap(), KeyTtl::Missing);
}

#[tokio::test]
#[ignore = "requires a running Redis instance"]
async fn test_unknown_session_is_not_found() {
    let store = connect().await;
    let sessions = SessionManager::new(store.clone(), SessionConfig::default());
    assert!(sessions.get("nonexistent-id").await.unwrap().is_none());
    store.close();
}

#[tokio::test]
async fn test_unreachable_redis_is_store_error() {
    let config = StoreConfig {
        host: "127.0.0.1".to_string(),
        // Reserved port, nothing listens here
        port: 1,
        ..StoreConfig::default()
    };
    let result = RedisStore::connect(&config).await;
    assert!(matches!(result, Err(ecdsa_session::AuthError::Store(_))));
}
