// Block data structures

use crate::core::{PreviousHash, TxRecord, canonical_json, current_timestamp, merkle_root, sha256_hex};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Block - a batch of committed transactions plus its proof-of-work
///
/// Serialized with exactly the keys `index, timestamp, transactions, proof,
/// merkle_root, previous_hash`; the canonical hash is taken over that form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, starting at 1 for genesis
    pub index: u64,
    /// Creation time (Unix seconds)
    pub timestamp: f64,
    /// Committed transactions
    pub transactions: Vec<TxRecord>,
    /// Proof-of-work solution
    pub proof: u64,
    /// Commitment over the transaction ids
    pub merkle_root: String,
    /// Canonical hash of the parent block, or the genesis sentinel
    pub previous_hash: PreviousHash,
}

impl Block {
    /// Create a new block stamped with the current time
    pub fn new(
        index: u64,
        transactions: Vec<TxRecord>,
        proof: u64,
        previous_hash: PreviousHash,
    ) -> Self {
        Self::with_timestamp(index, current_timestamp(), transactions, proof, previous_hash)
    }

    /// Create a block with an explicit timestamp
    pub fn with_timestamp(
        index: u64,
        timestamp: f64,
        transactions: Vec<TxRecord>,
        proof: u64,
        previous_hash: PreviousHash,
    ) -> Self {
        let merkle_root = Self::calculate_merkle_root(&transactions);
        Self {
            index,
            timestamp,
            transactions,
            proof,
            merkle_root,
            previous_hash,
        }
    }

    /// Merkle root over the transactions' ids
    pub fn calculate_merkle_root(transactions: &[TxRecord]) -> String {
        let ids: Vec<&str> = transactions.iter().map(|tx| tx.id.as_str()).collect();
        merkle_root(&ids)
    }

    /// Canonical JSON form (sorted keys)
    pub fn canonical_json(&self) -> Result<String> {
        canonical_json(self)
    }

    /// SHA256 over the canonical JSON form
    pub fn hash(&self) -> Result<String> {
        Ok(sha256_hex(self.canonical_json()?.as_bytes()))
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_genesis()
    }
}

/// Canonical hash of a block
pub fn canonical_hash(block: &Block) -> Result<String> {
    block.hash()
}
