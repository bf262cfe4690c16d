//! Caller-facing operations with their wire replies.
//!
//! Each operation returns a [`Reply`] carrying an HTTP-style status and a
//! JSON body, so any web framework can serve them with a one-line adapter.
//! Backend and verification failures are logged here and reported to the
//! caller only as `"exception"`.

use crate::{
    auth::{AuthService, SignedRequest},
    crypto::SignatureVerifier,
    error::AuthError,
    storage::SessionStore,
};
use serde_json::{json, Value};

/// Status and JSON body of an operation outcome
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, error: &str) -> Self {
        Self {
            status,
            body: json!({ "ok": false, "error": error }),
        }
    }

    /// Map a failure of an identity-proof operation
    fn from_proof_error(err: &AuthError) -> Self {
        match err {
            AuthError::MissingField(_) => Self::error(400, "missing fields"),
            AuthError::SignatureMismatch => Self::error(403, "signature invalid"),
            other => Self::internal(other),
        }
    }

    /// Map a failure of a session-id operation
    fn from_session_error(err: &AuthError) -> Self {
        match err {
            AuthError::MissingField(_) => Self::error(400, "missing id"),
            other => Self::internal(other),
        }
    }

    fn internal(err: &AuthError) -> Self {
        tracing::error!(error = %err, "Request failed");
        Self::error(500, "exception")
    }
}

impl<S: SessionStore, V: SignatureVerifier> AuthService<S, V> {
    /// Liveness check
    pub fn health(&self) -> Reply {
        Reply::ok(json!({ "ok": true }))
    }

    /// `POST verify-signature` → `{ ok: bool }`
    pub fn verify_signature(&self, request: &SignedRequest) -> Reply {
        match self.verify(request) {
            Ok(ok) => Reply::ok(json!({ "ok": ok })),
            Err(err) => Reply::from_proof_error(&err),
        }
    }

    /// `POST start-processing` → `{ ok: true, sessionId, start, expiry }`
    pub async fn start_processing(&self, request: &SignedRequest) -> Reply {
        match self.start(request).await {
            Ok(session) => Reply::ok(json!({
                "ok": true,
                "sessionId": session.id,
                "start": session.start,
                "expiry": session.expiry,
            })),
            Err(err) => Reply::from_proof_error(&err),
        }
    }

    /// `GET session/{id}` → `{ ok: true, address, start, expiry, remainingMs }`
    pub async fn session(&self, id: &str) -> Reply {
        match self.lookup(id).await {
            Ok(Some(status)) => Reply::ok(json!({
                "ok": true,
                "address": status.session.address,
                "start": status.session.start,
                "expiry": status.session.expiry,
                "remainingMs": status.remaining_ms,
            })),
            Ok(None) => Reply::ok(json!({ "ok": false, "error": "not_found" })),
            Err(err) => Reply::from_session_error(&err),
        }
    }

    /// `DELETE session/{id}` → `{ ok: true }`
    pub async fn delete_session(&self, id: &str) -> Reply {
        match self.revoke(id).await {
            Ok(()) => Reply::ok(json!({ "ok": true })),
            Err(err) => Reply::from_session_error(&err),
        }
    }
}
