// ECDSA keypairs and signatures
//
// The curve is fixed to secp256k1. Messages are hashed with SHA256 before
// signing; callers pass the raw payload bytes.

use crate::core::sha256_hash;
use crate::error::{LedgerError, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// Generate a fresh keypair
pub fn generate_keypair() -> Result<(SecretKey, PublicKey)> {
    let secp = Secp256k1::new();
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);

    // Fails for the (astronomically unlikely) zero or out-of-range scalar
    let secret_key = SecretKey::from_slice(&bytes)?;
    let public_key = secret_key.public_key(&secp);

    Ok((secret_key, public_key))
}

/// Sign a payload
pub fn sign(message: &[u8], secret_key: &SecretKey) -> Result<Signature> {
    let secp = Secp256k1::signing_only();
    let digest = message_digest(message)?;
    Ok(secp.sign_ecdsa(&digest, secret_key))
}

/// Verify a signature over a payload
pub fn verify(signature: &Signature, message: &[u8], public_key: &PublicKey) -> bool {
    let secp = Secp256k1::verification_only();

    match message_digest(message) {
        Ok(digest) => secp.verify_ecdsa(&digest, signature, public_key).is_ok(),
        Err(_) => false,
    }
}

/// Parse a DER-encoded signature from hex
pub fn signature_from_hex(hex_str: &str) -> Result<Signature> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| LedgerError::Signature(format!("Invalid signature encoding: {e}")))?;
    Ok(Signature::from_der(&bytes)?)
}

/// Encode a signature as hex DER
pub fn signature_to_hex(signature: &Signature) -> String {
    hex::encode(signature.serialize_der())
}

fn message_digest(message: &[u8]) -> Result<Message> {
    let hash = sha256_hash(message);
    Ok(Message::from_digest_slice(&hash)?)
}
