//! Key-value backends for session records.
//!
//! Every backend must enforce per-key expiry itself: records are written
//! with a millisecond TTL and become unreadable once it elapses, without
//! any action from this process.

pub mod memory;
pub mod redis;

use crate::error::Result;
use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Remaining lifetime of a key as reported by the backend clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTtl {
    /// Key does not exist (never written, deleted or expired)
    Missing,
    /// Key exists but carries no expiry
    Persistent,
    /// Key expires in this many milliseconds
    Expiring(u64),
}

impl KeyTtl {
    /// Interpret a raw `PTTL` reply: `-2` missing, `-1` no expiry
    pub fn from_pttl(reply: i64) -> Self {
        match reply {
            r if r >= 0 => KeyTtl::Expiring(r as u64),
            -1 => KeyTtl::Persistent,
            _ => KeyTtl::Missing,
        }
    }
}

/// TTL-capable key-value backend
///
/// Each call is a single atomic backend operation on one key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write `value` under `key`, expiring after `ttl_ms` milliseconds
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()>;

    /// Read the value under `key`, `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Query the backend's remaining lifetime for `key`
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Remove `key`; returns whether something was removed
    async fn delete(&self, key: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pttl() {
        assert_eq!(KeyTtl::from_pttl(-2), KeyTtl::Missing);
        assert_eq!(KeyTtl::from_pttl(-1), KeyTtl::Persistent);
        assert_eq!(KeyTtl::from_pttl(0), KeyTtl::Expiring(0));
        assert_eq!(KeyTtl::from_pttl(86_400_000), KeyTtl::Expiring(86_400_000));
    }
}
