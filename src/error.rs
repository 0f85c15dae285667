// Error types for ledger operations

use crate::consensus::ValidationError;
use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the ledger engine and its collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Key generation, signing or key parsing failed at the curve layer
    Signature(String),
    /// Transaction failed signature verification; the ledger was not touched
    TransactionRejected(String),
    /// A chain failed structural validation
    ChainValidation(ValidationError),
    /// Reachability probe or chain fetch failed
    PeerUnreachable(String),
    /// Peer address could not be parsed into host and port
    InvalidAddress(String),
    /// Persistence backend errors
    Storage(String),
    /// JSON encoding/decoding errors
    Serialization(String),
    /// File and socket I/O errors
    Io(String),
    /// Configuration errors
    Config(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Signature(msg) => write!(f, "Signature error: {msg}"),
            LedgerError::TransactionRejected(msg) => write!(f, "Transaction rejected: {msg}"),
            LedgerError::ChainValidation(err) => write!(f, "Chain validation failed: {err}"),
            LedgerError::PeerUnreachable(peer) => write!(f, "Peer unreachable: {peer}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::Storage(msg) => write!(f, "Storage error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::ChainValidation(err)
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<secp256k1::Error> for LedgerError {
    fn from(err: secp256k1::Error) -> Self {
        LedgerError::Signature(err.to_string())
    }
}
