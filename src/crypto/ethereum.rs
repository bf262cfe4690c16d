use crate::error::{AuthError, Result};
use easy_hasher::easy_hasher::raw_keccak256;
use libsecp256k1::{recover, Message, PublicKey, RecoveryId, Signature};

/// Prefix mandated by EIP-191 for `personal_sign` messages
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Full `r ‖ s ‖ v` signature length
const SIGNATURE_LEN: usize = 65;
/// EIP-2098 compact `r ‖ yParityAndS` signature length
const COMPACT_SIGNATURE_LEN: usize = 64;

/// Keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = raw_keccak256(data.to_vec()).to_vec();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Hash a message the way `personal_sign` does before signing
///
/// The digest covers `"\x19Ethereum Signed Message:\n" ++ len ++ message`,
/// where `len` is the decimal byte length of the UTF-8 message.
///
/// # Example
/// ```rust
/// use ecdsa_session::crypto::ethereum::hash_personal_message;
///
/// let digest = hash_personal_message("Some data");
/// assert_eq!(
///     hex::encode(digest),
///     "1da44b586eb0729ff70a73c326926f6ed5a25f5b056e7f47fbc6e58d86871655"
/// );
/// ```
pub fn hash_personal_message(message: &str) -> [u8; 32] {
    let mut payload = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    payload.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    payload.extend_from_slice(message.len().to_string().as_bytes());
    payload.extend_from_slice(message.as_bytes());
    keccak256(&payload)
}

/// Derive the lower-case `0x`-prefixed address of a public key
pub fn address_from_pubkey(public_key: &PublicKey) -> String {
    // Drop the 0x04 uncompressed-point tag before hashing
    let uncompressed = public_key.serialize();
    let digest = keccak256(&uncompressed[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Lower-case an address for storage and comparison
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Render an address with the EIP-55 mixed-case checksum
///
/// Input may be any case, with or without the `0x` prefix.
pub fn to_checksum_address(address: &str) -> String {
    let lower = normalize_address(address);
    let bare = lower.strip_prefix("0x").unwrap_or(&lower);
    let digest = hex::encode(keccak256(bare.as_bytes()));

    let mut out = String::with_capacity(bare.len() + 2);
    out.push_str("0x");
    for (c, nibble) in bare.chars().zip(digest.chars()) {
        if c.is_ascii_alphabetic() && nibble.to_digit(16).unwrap_or(0) >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Split a hex signature into its 64-byte `r ‖ s` body and recovery id
fn parse_signature(signature: &str) -> Result<(Signature, RecoveryId)> {
    let trimmed = signature.trim();
    let hex_body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(hex_body)
        .map_err(|e| AuthError::InvalidSignature(format!("Invalid signature hex: {e}")))?;

    let (rs, parity) = match bytes.len() {
        SIGNATURE_LEN => {
            let parity = match bytes[64] {
                0 | 1 => bytes[64],
                27 | 28 => bytes[64] - 27,
                v => {
                    return Err(AuthError::InvalidSignature(format!(
                        "Invalid recovery id: {v}"
                    )))
                }
            };
            // Same canonical-s rule as ethers: the top bit of s must be clear
            if bytes[32] & 0x80 != 0 {
                return Err(AuthError::InvalidSignature(
                    "Non-canonical signature: s has its top bit set".to_string(),
                ));
            }
            let mut rs = [0u8; 64];
            rs.copy_from_slice(&bytes[..64]);
            (rs, parity)
        }
        COMPACT_SIGNATURE_LEN => {
            // Top bit of s carries the y parity
            let mut rs = [0u8; 64];
            rs.copy_from_slice(&bytes);
            let parity = rs[32] >> 7;
            rs[32] &= 0x7f;
            (rs, parity)
        }
        len => {
            return Err(AuthError::InvalidSignature(format!(
                "Invalid signature length: expected {SIGNATURE_LEN} or {COMPACT_SIGNATURE_LEN} bytes, got {len}"
            )))
        }
    };

    let signature = Signature::parse_standard(&rs)
        .map_err(|e| AuthError::InvalidSignature(format!("Failed to parse signature: {e}")))?;
    let recovery_id = RecoveryId::parse(parity)
        .map_err(|e| AuthError::InvalidSignature(format!("Invalid recovery id: {e}")))?;

    Ok((signature, recovery_id))
}

/// Recover the signer address of a `personal_sign` signature
///
/// # Arguments
/// * `message` - The exact UTF-8 message that was signed
/// * `signature` - Hex signature, `0x` prefix optional, 65 or 64 (compact) bytes
///
/// # Returns
/// * `Ok(String)` - Lower-case `0x`-prefixed signer address
/// * `Err(AuthError::InvalidSignature)` - Signature is malformed or unrecoverable
pub fn recover_address(message: &str, signature: &str) -> Result<String> {
    let (signature, recovery_id) = parse_signature(signature)?;
    let digest = Message::parse(&hash_personal_message(message));

    let public_key = recover(&digest, &signature, &recovery_id)
        .map_err(|e| AuthError::InvalidSignature(format!("Failed to recover signer: {e}")))?;

    Ok(address_from_pubkey(&public_key))
}

/// Verify that `address` signed `message`
///
/// # Returns
/// * `Ok(true)` - Recovered signer equals `address`, ignoring case
/// * `Ok(false)` - Signature is valid but belongs to someone else
/// * `Err(AuthError::InvalidSignature)` - Signature is malformed or unrecoverable
///
/// # Example
/// ```rust
/// use ecdsa_session::crypto::ethereum::verify_message;
///
/// let signature = "0xb91467e570a6466aa9e9876cbcd013baba02900b8979d43fe208a4a4f339f5fd\
///                  6007e74cd82e037b800186422fc2da167c747ef045e5d18a5f5d4300f8e1a0291c";
/// let ok = verify_message(
///     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
///     "Some data",
///     signature,
/// )
/// .unwrap();
/// assert!(ok);
/// ```
pub fn verify_message(address: &str, message: &str, signature: &str) -> Result<bool> {
    let recovered = recover_address(message, signature)?;
    Ok(recovered.eq_ignore_ascii_case(address.trim()))
}
