//! Session lifecycle against a TTL-enforcing backend.
//!
//! Backend key layout: `{prefix}:{id}` holding the JSON record
//! `{"address": …, "start": …, "expiry": …}` with a millisecond TTL equal to
//! the session duration. Remaining lifetime is always read back from the
//! backend rather than recomputed from `expiry`.

use crate::config::SessionConfig;
use crate::crypto::ethereum::{normalize_address, to_checksum_address};
use crate::error::{AuthError, Result};
use crate::storage::{KeyTtl, SessionStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A session bound to a verified address
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Random UUID v4, the external lookup key
    pub id: String,
    /// Lower-cased signer address
    pub address: String,
    /// Creation time, Unix milliseconds
    pub start: i64,
    /// `start + duration`, Unix milliseconds
    pub expiry: i64,
}

/// A live session plus the backend's view of its remaining lifetime
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    pub session: Session,
    pub remaining_ms: u64,
}

/// Value persisted under the session key
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    address: String,
    start: i64,
    expiry: i64,
}

/// Creates, reads and deletes sessions
///
/// Holds no mutable state of its own; the backend is the only source of
/// truth, so clones can be shared freely across tasks.
pub struct SessionManager<S> {
    store: Arc<S>,
    config: SessionConfig,
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, id: &str) -> String {
        format!("{}:{}", self.config.key_prefix, id)
    }

    /// Mint a session for an address that has already been verified
    ///
    /// Value and TTL are written in a single backend command, so either the
    /// full record with its expiry exists afterwards or nothing does.
    ///
    /// # Errors
    /// - `MissingField` - `address` is empty
    /// - `Config` - the configured duration does not fit a millisecond timestamp
    /// - `Store` - the backend write failed
    pub async fn create(&self, address: &str) -> Result<Session> {
        let address = normalize_address(address);
        if address.is_empty() {
            return Err(AuthError::MissingField("address".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let start = Utc::now().timestamp_millis();
        let expiry = i64::try_from(self.config.duration_ms)
            .ok()
            .and_then(|duration| start.checked_add(duration))
            .ok_or_else(|| {
                AuthError::Config(format!(
                    "session duration {} ms overflows the expiry timestamp",
                    self.config.duration_ms
                ))
            })?;

        let record = serde_json::to_string(&StoredSession {
            address: address.clone(),
            start,
            expiry,
        })?;

        self.store
            .set_with_ttl(&self.key(&id), &record, self.config.duration_ms)
            .await?;

        tracing::info!(
            session_id = %id,
            address = %to_checksum_address(&address),
            expiry,
            "Session created"
        );

        Ok(Session {
            id,
            address,
            start,
            expiry,
        })
    }

    /// Look up a session and its remaining lifetime
    ///
    /// Returns `Ok(None)` when the session never existed, was deleted or has
    /// expired. A record stored without any expiry reports zero remaining.
    ///
    /// # Errors
    /// - `MissingField` - `id` is empty
    /// - `Store` - the backend failed or returned an unreadable record
    pub async fn get(&self, id: &str) -> Result<Option<SessionStatus>> {
        if id.trim().is_empty() {
            return Err(AuthError::MissingField("id".to_string()));
        }

        let key = self.key(id);
        let Some(raw) = self.store.get(&key).await? else {
            tracing::debug!(session_id = %id, "Session not found");
            return Ok(None);
        };
        let stored: StoredSession = serde_json::from_str(&raw)?;

        let remaining_ms = match self.store.ttl(&key).await? {
            KeyTtl::Expiring(ms) => ms,
            KeyTtl::Persistent => {
                tracing::warn!(session_id = %id, "Session key has no expiry, reporting zero remaining");
                0
            }
            KeyTtl::Missing => {
                // Expired between the read and the TTL query
                tracing::debug!(session_id = %id, "Session expired during lookup");
                return Ok(None);
            }
        };

        Ok(Some(SessionStatus {
            session: Session {
                id: id.to_string(),
                address: stored.address,
                start: stored.start,
                expiry: stored.expiry,
            },
            remaining_ms,
        }))
    }

    /// Remove a session
    ///
    /// Idempotent: deleting an unknown or expired session succeeds too.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(AuthError::MissingField("id".to_string()));
        }

        let removed = self.store.delete(&self.key(id)).await?;
        tracing::info!(session_id = %id, removed, "Session deleted");
        Ok(())
    }
}
