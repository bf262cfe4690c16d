pub mod ethereum;

use crate::error::Result;

// Re-export main functions for easier access
pub use ethereum::{recover_address, verify_message};

/// Identity proof check gating every session operation
///
/// Implementations must be pure: no I/O, no shared state. `Ok(false)` means
/// the proof is well formed but signed by someone else; a proof that cannot
/// be parsed at all is an error.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, address: &str, message: &str, signature: &str) -> Result<bool>;
}

/// EIP-191 `personal_sign` verifier over secp256k1 public-key recovery
#[derive(Clone, Copy, Debug, Default)]
pub struct EthereumVerifier;

impl SignatureVerifier for EthereumVerifier {
    fn verify(&self, address: &str, message: &str, signature: &str) -> Result<bool> {
        verify_message(address, message, signature)
    }
}
