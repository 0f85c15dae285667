// Hashing utilities

use sha2::{Digest, Sha256};

/// Single SHA256 hash
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// SHA256 rendered as lowercase hex (64 chars)
/// All ledger identifiers (transaction ids, output ids, block hashes,
/// merkle nodes) use this form.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_hash(data))
}

/// Hash the plain string concatenation of the given parts
pub fn hash_concat(parts: &[&str]) -> String {
    sha256_hex(parts.concat().as_bytes())
}
