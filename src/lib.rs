//! # ecdsa-session
//!
//! **Ethereum signature-gated sessions** with **store-enforced expiry**.
//! A client proves control of an address by signing a message with
//! `personal_sign` (EIP-191); the service then issues a 24-hour session
//! whose lifetime is enforced by the backing key-value store itself.
//!
//! ## Features
//!
//! - **EIP-191 Signature Verification** - secp256k1 public-key recovery, 65-byte and compact signatures
//! - **Store-Enforced Expiry** - sessions are written with a millisecond TTL in a single command
//! - **Backend-Authoritative Lifetime** - remaining time is read from the store's own clock
//! - **Pluggable Backends** - Redis for production, an in-memory store for tests
//! - **Transport-Agnostic Replies** - status + JSON body for each operation, ready for any web framework
//!
//! ## Quick Start
//!
//! ```rust
//! use ecdsa_session::{AuthService, MemoryStore, SessionConfig, SessionManager, SignedRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> ecdsa_session::Result<()> {
//! let sessions = SessionManager::new(MemoryStore::new(), SessionConfig::default());
//! let auth_service = AuthService::new(sessions);
//!
//! let request = SignedRequest::new(
//!     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
//!     "Some data",
//!     "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd\
//!      6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c",
//! );
//!
//! let session = auth_service.start(&request).await?;
//! let status = auth_service.lookup(&session.id).await?.expect("session is live");
//! assert_eq!(status.session.expiry - status.session.start, 86_400_000);
//! # Ok(())
//! # }
//! ```
//!
//! In production, connect a [`RedisStore`] instead:
//!
//! ```rust,no_run
//! use ecdsa_session::{AuthService, RedisStore, ServiceConfig, SessionManager};
//!
//! # async fn run() -> ecdsa_session::Result<()> {
//! let config = ServiceConfig::from_env()?;
//! let store = RedisStore::connect(&config.store).await?;
//! let auth_service = AuthService::new(SessionManager::new(store, config.session));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod session;
pub mod storage;

// Re-export main types for easier access
pub use api::Reply;
pub use auth::{AuthService, SignedRequest};
pub use config::{ServiceConfig, SessionConfig, StoreConfig};
pub use crypto::{EthereumVerifier, SignatureVerifier};
pub use crypto::ethereum::{recover_address, verify_message};
pub use error::{AuthError, Result};
pub use session::{Session, SessionManager, SessionStatus};
pub use storage::{KeyTtl, MemoryStore, RedisStore, SessionStore};
