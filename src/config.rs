use crate::error::{AuthError, Result};
use secrecy::Secret;
use serde::{Deserialize, Deserializer};
use std::env;

/// Session lifetime handed out at creation: 24 hours
pub const DEFAULT_SESSION_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Longest session lifetime accepted from configuration: 365 days
pub const MAX_SESSION_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1000;

/// Key namespace for stored sessions
pub const DEFAULT_KEY_PREFIX: &str = "session";

/// Connection settings for the Redis session backend
///
/// # Example
/// ```rust
/// use ecdsa_session::StoreConfig;
/// use secrecy::Secret;
///
/// let config = StoreConfig {
///     host: "127.0.0.1".to_string(),
///     port: 6379,
///     password: Some(Secret::new("hunter2".to_string())),
///     db: 0,
/// };
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    /// Backend host name or IP address
    pub host: String,
    /// Backend TCP port
    pub port: u16,
    /// Optional AUTH password
    ///
    /// Redacted in `Debug` output.
    #[serde(default)]
    pub password: Option<Secret<String>>,
    /// Logical database index
    #[serde(default)]
    pub db: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
        }
    }
}

/// Session issuing settings
#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    /// Fixed lifetime of every session, in milliseconds
    ///
    /// Used both for the `expiry` field and for the backend TTL so the
    /// two never differ in unit or precision.
    #[serde(
        default = "default_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub duration_ms: u64,
    /// Prefix of the backend key, joined to the session id with `:`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_duration_ms() -> u64 {
    DEFAULT_SESSION_DURATION_MS
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

/// Accept only lifetimes in `1..=MAX_SESSION_DURATION_MS`
fn validate_duration_ms(duration_ms: u64) -> Result<u64> {
    if duration_ms == 0 || duration_ms > MAX_SESSION_DURATION_MS {
        return Err(AuthError::Config(format!(
            "session duration must be between 1 and {MAX_SESSION_DURATION_MS} ms, got {duration_ms}"
        )));
    }
    Ok(duration_ms)
}

fn deserialize_duration_ms<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let duration_ms = u64::deserialize(deserializer)?;
    validate_duration_ms(duration_ms).map_err(serde::de::Error::custom)
}

impl SessionConfig {
    /// Build a session config, rejecting out-of-range lifetimes
    pub fn new(duration_ms: u64, key_prefix: impl Into<String>) -> Result<Self> {
        Ok(Self {
            duration_ms: validate_duration_ms(duration_ms)?,
            key_prefix: key_prefix.into(),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_SESSION_DURATION_MS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Everything a hosting process needs to build the service
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    ///
    /// A `.env` file is read first when present. Recognized variables:
    /// `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`,
    /// `SESSION_DURATION_MS`, `SESSION_KEY_PREFIX`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let host = env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env_or_default("REDIS_PORT", 6379u16)?;
        let password = env::var("REDIS_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .map(Secret::new);
        let db = parse_env_or_default("REDIS_DB", 0i64)?;

        let duration_ms = parse_env_or_default("SESSION_DURATION_MS", DEFAULT_SESSION_DURATION_MS)?;
        let key_prefix =
            env::var("SESSION_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());
        let session = SessionConfig::new(duration_ms, key_prefix)?;

        Ok(Self {
            store: StoreConfig {
                host,
                port,
                password,
                db,
            },
            session,
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| AuthError::Config(format!("Failed to parse {key}: {e}: {val}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Mutex;

    // Tests mutate process-wide env vars
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "REDIS_HOST",
        "REDIS_PORT",
        "REDIS_PASSWORD",
        "REDIS_DB",
        "SESSION_DURATION_MS",
        "SESSION_KEY_PREFIX",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        // Pin values a local .env might otherwise supply
        env::set_var("REDIS_HOST", "127.0.0.1");
        env::set_var("REDIS_PORT", "6379");
        env::set_var("REDIS_DB", "0");
        env::set_var("SESSION_DURATION_MS", "86400000");
        env::set_var("SESSION_KEY_PREFIX", "session");
        env::set_var("REDIS_PASSWORD", "");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.store.host, "127.0.0.1");
        assert_eq!(config.store.port, 6379);
        assert!(config.store.password.is_none());
        assert_eq!(config.session.duration_ms, 86_400_000);
        assert_eq!(config.session.key_prefix, "session");

        clear_env();
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("REDIS_HOST", "redis.internal");
        env::set_var("REDIS_PORT", "6380");
        env::set_var("REDIS_PASSWORD", "s3cret");
        env::set_var("REDIS_DB", "2");
        env::set_var("SESSION_DURATION_MS", "60000");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.store.host, "redis.internal");
        assert_eq!(config.store.port, 6380);
        assert_eq!(config.store.db, 2);
        assert_eq!(
            config.store.password.as_ref().unwrap().expose_secret(),
            "s3cret"
        );
        assert_eq!(config.session.duration_ms, 60_000);

        clear_env();
    }

    #[test]
    fn test_invalid_port() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("REDIS_PORT", "not-a-port");

        let result = ServiceConfig::from_env();
        assert!(matches!(result, Err(AuthError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_zero_duration_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("SESSION_DURATION_MS", "0");

        let result = ServiceConfig::from_env();
        assert!(matches!(result, Err(AuthError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("SESSION_DURATION_MS", "18446744073709551615");

        let result = ServiceConfig::from_env();
        assert!(matches!(result, Err(AuthError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_session_config_new_bounds() {
        assert!(SessionConfig::new(DEFAULT_SESSION_DURATION_MS, "session").is_ok());
        assert!(SessionConfig::new(MAX_SESSION_DURATION_MS, "session").is_ok());
        assert!(matches!(
            SessionConfig::new(0, "session"),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            SessionConfig::new(MAX_SESSION_DURATION_MS + 1, "session"),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_duration() {
        let too_long = format!(r#"{{"session":{{"duration_ms":{}}}}}"#, u64::MAX);
        assert!(serde_json::from_str::<ServiceConfig>(&too_long).is_err());
        assert!(serde_json::from_str::<ServiceConfig>(r#"{"session":{"duration_ms":0}}"#).is_err());
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let config = StoreConfig {
            password: Some(Secret::new("s3cret".to_string())),
            ..StoreConfig::default()
        };
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"store":{"host":"db","port":7000}}"#).unwrap();
        assert_eq!(config.store.host, "db");
        assert_eq!(config.store.port, 7000);
        assert_eq!(config.session.duration_ms, DEFAULT_SESSION_DURATION_MS);
    }
}
