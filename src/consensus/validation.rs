// Structural chain validation

use crate::consensus::pow::valid_proof;
use crate::core::Block;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Chain has no blocks at all
    EmptyChain,
    /// Block does not link to the canonical hash of its predecessor
    PreviousHashMismatch { index: usize },
    /// Block's proof does not satisfy the predicate with its predecessor's proof
    InvalidProofOfWork { index: usize },
    /// Block could not be serialized for hashing
    Unhashable { index: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::EmptyChain => write!(f, "Chain has no blocks"),
            ValidationError::PreviousHashMismatch { index } => {
                write!(f, "Previous hash mismatch at block {index}")
            }
            ValidationError::InvalidProofOfWork { index } => {
                write!(f, "Invalid proof of work at block {index}")
            }
            ValidationError::Unhashable { index } => write!(f, "Cannot hash block {index}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check hash linkage and proof-of-work across a chain
///
/// Walks from the second block on. Merkle roots are not recomputed and
/// transactions are not replayed; only the structure is checked. A chain of
/// just the genesis block is valid. `index` in errors is the 1-based
/// position of the offending block.
pub fn validate_chain(chain: &[Block]) -> Result<(), ValidationError> {
    if chain.is_empty() {
        return Err(ValidationError::EmptyChain);
    }

    for (offset, pair) in chain.windows(2).enumerate() {
        let (last_block, block) = (&pair[0], &pair[1]);
        let index = offset + 2;

        let last_hash = last_block
            .hash()
            .map_err(|_| ValidationError::Unhashable { index: index - 1 })?;
        if !block.previous_hash.matches(&last_hash) {
            return Err(ValidationError::PreviousHashMismatch { index });
        }

        if !valid_proof(last_block.proof, block.proof) {
            return Err(ValidationError::InvalidProofOfWork { index });
        }
    }

    Ok(())
}

/// Boolean form of [`validate_chain`]
pub fn valid_chain(chain: &[Block]) -> bool {
    match validate_chain(chain) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Chain of {} block(s) rejected: {}", chain.len(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Blockchain, Identity, PreviousHash, TxRecord};

    fn record(id: &str) -> TxRecord {
        TxRecord {
            id: id.to_string(),
            sender: Identity::mint(),
            recipient: Identity::from("alice"),
            amount: 1.0,
        }
    }

    // Proofs 100 -> 35293 -> 35089 each satisfy the predicate
    fn mined_chain() -> Vec<Block> {
        let mut chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        chain.queue(record("t1"));
        chain.new_block(35293, None).unwrap();
        chain.queue(record("t2"));
        chain.new_block(35089, None).unwrap();
        chain.blocks().to_vec()
    }

    #[test]
    fn test_genesis_only_chain_is_valid() {
        let chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        assert!(valid_chain(chain.blocks()));
    }

    #[test]
    fn test_empty_chain_is_invalid() {
        assert_eq!(validate_chain(&[]), Err(ValidationError::EmptyChain));
        assert!(!valid_chain(&[]));
    }

    #[test]
    fn test_mined_chain_is_valid() {
        assert_eq!(validate_chain(&mined_chain()), Ok(()));
    }

    #[test]
    fn test_broken_link_detected() {
        let mut chain = mined_chain();
        chain[2].previous_hash = PreviousHash::Hash("deadbeef".to_string());

        assert_eq!(
            validate_chain(&chain),
            Err(ValidationError::PreviousHashMismatch { index: 3 })
        );
    }

    #[test]
    fn test_tampered_middle_block_detected() {
        let mut chain = mined_chain();
        chain[1].transactions[0].amount = 1_000_000.0;

        assert_eq!(
            validate_chain(&chain),
            Err(ValidationError::PreviousHashMismatch { index: 3 })
        );
    }

    #[test]
    fn test_bad_proof_detected() {
        let mut chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        chain.new_block(35292, None).unwrap();

        assert_eq!(
            validate_chain(chain.blocks()),
            Err(ValidationError::InvalidProofOfWork { index: 2 })
        );
    }

    #[test]
    fn test_merkle_root_not_checked() {
        // Only linkage and proofs are checked; a stale merkle root on the
        // tip goes unnoticed.
        let mut chain = mined_chain();
        chain[2].merkle_root = "not-a-root".to_string();

        assert!(valid_chain(&chain));
    }
}
