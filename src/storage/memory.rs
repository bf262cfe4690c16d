//! In-process backend with the same expiry contract as Redis.
//!
//! Deadlines are measured with `tokio::time::Instant`, so tests running
//! under a paused runtime can move the clock with `tokio::time::advance`.

use super::{KeyTtl, SessionStore};
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| deadline > now)
    }
}

/// Map-backed session store with lazy expiry
///
/// Expired entries are dropped when their key is read or when `len` runs;
/// nothing removes them in the background.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value with no expiry, the way a stray `SET` would
    pub fn insert_persistent(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: None,
            },
        );
        Ok(())
    }

    /// Number of live keys, sweeping out expired ones
    pub fn len(&self) -> Result<usize> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        entries.retain(|_, e| e.is_live(now));
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Store("memory store lock poisoned".to_string()))
    }

    /// Fetch a live entry, dropping it first if its deadline has passed
    fn live<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a Entry> {
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        entries.get(key)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(ttl_ms);
        self.lock()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: Some(deadline),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        Ok(Self::live(&mut entries, key, now).map(|e| e.value.clone()))
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        let ttl = match Self::live(&mut entries, key, now) {
            None => KeyTtl::Missing,
            Some(Entry { deadline: None, .. }) => KeyTtl::Persistent,
            Some(Entry {
                deadline: Some(deadline),
                ..
            }) => KeyTtl::Expiring(deadline.saturating_duration_since(now).as_millis() as u64),
        };
        Ok(ttl)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        let removed = entries.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }
}
