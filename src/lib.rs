// UTXO ledger: signed transactions, hash-linked blocks, proof-of-work and
// longest-valid-chain consensus between peer nodes

pub mod cli;
pub mod config;
pub mod consensus;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod wallet;

// Re-exports for convenience
pub use cli::{Cli, CliHandler};
pub use config::NodeConfig;
pub use consensus::{ConsensusResolver, Miner, MiningControl, Resolution, ValidationError, valid_chain};
pub use crate::core::{Block, Blockchain, Identity, Transaction, TxInput, TxOutput, TxRecord, TxSequence, canonical_hash};
pub use error::{LedgerError, Result};
pub use network::{Node, PeerRegistry, PeerTransport, TcpTransport};
pub use storage::{ChainDb, ChainStore, UtxoLedger};
pub use wallet::{KeyPair, Keystore, TransactionBuilder};
