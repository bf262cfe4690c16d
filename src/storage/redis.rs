//! Redis backend.
//!
//! Records are written with `PSETEX` so value and TTL land in one command,
//! and remaining lifetime is read back with `PTTL` in the same millisecond
//! unit the TTL was set with.

use super::{KeyTtl, SessionStore};
use crate::config::StoreConfig;
use crate::error::Result;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use secrecy::ExposeSecret;

/// Session backend over a shared multiplexed Redis connection
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    con: MultiplexedConnection,
}

impl RedisStore {
    /// Open the connection described by `config`
    ///
    /// Fails with `AuthError::Store` if the server is unreachable or rejects
    /// the credentials.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                db: config.db,
                password: config
                    .password
                    .as_ref()
                    .map(|p| p.expose_secret().clone()),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info)?;
        let con = client.get_multiplexed_async_connection().await?;
        tracing::info!(host = %config.host, port = config.port, db = config.db, "Connected to Redis");

        Ok(Self::from_connection(con))
    }

    /// Wrap an already established connection
    pub fn from_connection(con: MultiplexedConnection) -> Self {
        Self { con }
    }

    /// Release this handle's connection
    ///
    /// The socket closes once every clone has been closed or dropped.
    pub fn close(self) {
        drop(self.con);
        tracing::info!("Redis session store closed");
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        let mut con = self.con.clone();
        con.pset_ex::<_, _, ()>(key, value, ttl_ms).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut con = self.con.clone();
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut con = self.con.clone();
        let reply: i64 = con.pttl(key).await?;
        Ok(KeyTtl::from_pttl(reply))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut con = self.con.clone();
        let removed: i64 = con.del(key).await?;
        Ok(removed > 0)
    }
}
