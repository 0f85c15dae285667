// Basic types for the ledger

use crate::error::{LedgerError, Result};
use secp256k1::PublicKey;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity used as sender of minted value (genesis and mining rewards)
pub const MINT_IDENTITY: &str = "0";

/// Account identity
/// The hex-encoded compressed public key is the account identifier; there is
/// no separate address derivation. The mint identity `"0"` is the only
/// identity that is not a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    /// Identity of a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(hex::encode(public_key.serialize()))
    }

    /// The mint identity
    pub fn mint() -> Self {
        Self(MINT_IDENTITY.to_string())
    }

    pub fn is_mint(&self) -> bool {
        self.0 == MINT_IDENTITY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the identity back into a public key
    pub fn to_public_key(&self) -> Result<PublicKey> {
        let bytes = hex::decode(&self.0)
            .map_err(|e| LedgerError::Signature(format!("Invalid identity encoding: {e}")))?;
        Ok(PublicKey::from_slice(&bytes)?)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Link from a block to its parent
/// The genesis block carries the literal sentinel `1` (a JSON integer, not a
/// hash string); every other block carries the canonical hash of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousHash {
    Genesis,
    Hash(String),
}

impl PreviousHash {
    /// The sentinel value written for the genesis block
    pub const GENESIS_SENTINEL: u64 = 1;

    pub fn is_genesis(&self) -> bool {
        matches!(self, PreviousHash::Genesis)
    }

    /// Whether this link points at the given hash
    pub fn matches(&self, hash: &str) -> bool {
        match self {
            PreviousHash::Hash(h) => h == hash,
            PreviousHash::Genesis => false,
        }
    }
}

impl fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PreviousHash::Genesis => write!(f, "{}", Self::GENESIS_SENTINEL),
            PreviousHash::Hash(h) => write!(f, "{h}"),
        }
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PreviousHash::Genesis => serializer.serialize_u64(Self::GENESIS_SENTINEL),
            PreviousHash::Hash(h) => serializer.serialize_str(h),
        }
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) if n == Self::GENESIS_SENTINEL => Ok(PreviousHash::Genesis),
            Raw::Number(n) => Err(de::Error::custom(format!(
                "invalid previous_hash sentinel: {n}"
            ))),
            Raw::Text(h) => Ok(PreviousHash::Hash(h)),
        }
    }
}

/// Render an amount the way it enters signed payloads and identifiers
///
/// Shortest round-trip digits. Whole values keep a trailing `.0` (`100.0`,
/// not `100`). Magnitudes below `1e-4` or from `1e16` up switch to exponent
/// form with a signed, at least two-digit exponent (`1e+16`, `1.5e-07`).
pub fn format_amount(amount: f64) -> String {
    if amount.is_nan() {
        return "nan".to_string();
    }

    let repr = format!("{amount:?}");
    let Some((mantissa, exponent)) = repr.split_once('e') else {
        return repr;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Seconds since the Unix epoch, with sub-second precision
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
