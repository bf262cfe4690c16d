use std::fmt;

/// Authentication and session operation errors
///
/// Each variant corresponds to one caller-facing failure class. A session
/// that does not exist is not an error: lookups return `Ok(None)` instead.
///
/// # Example
/// ```rust
/// use ecdsa_session::{AuthError, Result};
///
/// fn handle_result(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Operation successful"),
///         Err(AuthError::InvalidSignature(msg)) => println!("Signature error: {}", msg),
///         Err(AuthError::Store(msg)) => println!("Backend unavailable: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum AuthError {
    /// A required request field is missing or empty
    ///
    /// Raised before any signature is checked or any session is touched.
    MissingField(String),

    /// Signature could not be decoded or no signer could be recovered from it
    ///
    /// This error occurs when:
    /// - The signature is not valid hex
    /// - The signature is neither 65 bytes nor 64 bytes (compact form)
    /// - The recovery id is not one of 0, 1, 27 or 28
    /// - The r/s scalars overflow or do not describe a curve point
    InvalidSignature(String),

    /// Signature is well formed but was produced by a different address
    SignatureMismatch,

    /// The session backend failed or returned an unreadable record
    ///
    /// Surfaced as-is; nothing inside the crate retries.
    Store(String),

    /// Configuration could not be loaded
    Config(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingField(field) => {
                write!(f, "Missing required field: {field}")
            }
            AuthError::InvalidSignature(msg) => {
                write!(f, "Signature verification failed: {msg}")
            }
            AuthError::SignatureMismatch => {
                write!(f, "Signature does not match the claimed address")
            }
            AuthError::Store(msg) => {
                write!(f, "Session store error: {msg}")
            }
            AuthError::Config(msg) => {
                write!(f, "Configuration error: {msg}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        AuthError::Store(format!("Redis error: {err}"))
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Store(format!("Unreadable session record: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
