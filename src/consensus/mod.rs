// Consensus: proof-of-work, chain validation and longest-chain resolution

pub mod pow;
pub mod resolver;
pub mod validation;

pub use pow::{CHECK_INTERVAL, DIFFICULTY_PREFIX, Miner, MiningControl, MiningResult, valid_proof};
pub use resolver::{ConsensusResolver, Resolution, select_longest};
pub use validation::{ValidationError, valid_chain, validate_chain};
