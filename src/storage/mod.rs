// Storage layer: the in-memory UTXO ledger and durable chain storage

mod blockchain_db;
mod utxo_set;

pub use blockchain_db::{ChainDb, ChainStore};
pub use utxo_set::UtxoLedger;
