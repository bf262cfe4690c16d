use crate::{
    crypto::{EthereumVerifier, SignatureVerifier},
    error::{AuthError, Result},
    session::{Session, SessionManager, SessionStatus},
    storage::SessionStore,
};
use serde::{Deserialize, Serialize};

/// Identity proof submitted by a client
///
/// Fields are optional so that a request body with missing keys still
/// deserializes and can be rejected with a precise `MissingField` error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignedRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

impl SignedRequest {
    pub fn new(
        address: impl Into<String>,
        message: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            address: Some(address.into()),
            message: Some(message.into()),
            signature: Some(signature.into()),
        }
    }

    /// Borrow all three fields, failing on the first missing or empty one
    fn fields(&self) -> Result<(&str, &str, &str)> {
        fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
            match value.as_deref() {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(AuthError::MissingField(name.to_string())),
            }
        }

        Ok((
            required(&self.address, "address")?,
            required(&self.message, "message")?,
            required(&self.signature, "signature")?,
        ))
    }
}

/// Signature-gated session service
///
/// Composes an identity verifier with a session manager. No session is
/// created or inspected unless input validation and, for creation,
/// signature verification have passed first.
pub struct AuthService<S, V = EthereumVerifier> {
    verifier: V,
    sessions: SessionManager<S>,
}

impl<S: SessionStore> AuthService<S> {
    /// Create a service using EIP-191 signature verification
    pub fn new(sessions: SessionManager<S>) -> Self {
        Self::with_verifier(sessions, EthereumVerifier)
    }
}

impl<S: SessionStore, V: SignatureVerifier> AuthService<S, V> {
    pub fn with_verifier(sessions: SessionManager<S>, verifier: V) -> Self {
        Self { verifier, sessions }
    }

    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    /// Check an identity proof without creating anything
    ///
    /// # Returns
    /// * `Ok(true)` - The signature was produced by `address`
    /// * `Ok(false)` - The signature was produced by someone else
    ///
    /// # Errors
    /// - `MissingField` - a request field is absent or empty
    /// - `InvalidSignature` - the signature cannot be parsed or recovered
    pub fn verify(&self, request: &SignedRequest) -> Result<bool> {
        let (address, message, signature) = request.fields()?;
        self.verifier.verify(address, message, signature)
    }

    /// Verify an identity proof and open a session for it
    ///
    /// # Errors
    /// - `MissingField` - a request field is absent or empty
    /// - `InvalidSignature` - the signature cannot be parsed or recovered
    /// - `SignatureMismatch` - the signer is not the claimed address
    /// - `Store` - the session could not be written
    pub async fn start(&self, request: &SignedRequest) -> Result<Session> {
        if !self.verify(request)? {
            tracing::debug!(address = ?request.address, "Rejected session start: signature mismatch");
            return Err(AuthError::SignatureMismatch);
        }
        let (address, _, _) = request.fields()?;
        self.sessions.create(address).await
    }

    /// Look up a session, `Ok(None)` if it does not exist or has expired
    pub async fn lookup(&self, id: &str) -> Result<Option<SessionStatus>> {
        self.sessions.get(id).await
    }

    /// Delete a session; succeeds whether or not it existed
    pub async fn revoke(&self, id: &str) -> Result<()> {
        self.sessions.delete(id).await
    }
}
