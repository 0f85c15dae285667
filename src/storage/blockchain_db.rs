// Chain and peer persistence using sled

use crate::core::Block;
use crate::error::{LedgerError, Result};
use sled::Db;
use std::collections::BTreeSet;
use std::path::Path;

/// Durable storage for a node's chain and its known peers
pub trait ChainStore: Send + Sync + 'static {
    /// Load the chain previously saved for a node
    fn load_chain_for_node(&self, node_id: &str) -> Result<Option<Vec<Block>>>;
    /// Store a whole chain, replacing whatever was stored for the node
    fn save_new_chain(&self, chain: &[Block], node_id: &str) -> Result<()>;
    /// Append one block to the node's stored chain
    fn append_block(&self, block: &Block, node_id: &str) -> Result<()>;
    /// Forget the node's chain
    fn delete_chain(&self, node_id: &str) -> Result<()>;
    /// Load the known peer addresses
    fn load_known_peers(&self) -> Result<BTreeSet<String>>;
    /// Store the known peer addresses
    fn record_peers(&self, peers: &BTreeSet<String>) -> Result<()>;
}

const PEERS_KEY: &[u8] = b"peers";

/// Chain database
/// Each node's chain lives in its own tree, keyed by big-endian block index
/// so iteration order is chain order.
pub struct ChainDb {
    db: Db,
}

impl ChainDb {
    /// Open (or create) a database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| LedgerError::Storage(format!("Failed to open database: {e}")))?;
        Ok(Self { db })
    }

    /// Create an in-memory database (for testing)
    pub fn memory() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config
            .open()
            .map_err(|e| LedgerError::Storage(format!("Failed to create memory db: {e}")))?;
        Ok(Self { db })
    }

    fn chain_tree(&self, node_id: &str) -> Result<sled::Tree> {
        Ok(self.db.open_tree(Self::chain_tree_name(node_id))?)
    }

    // Helper: tree name for a node's chain
    fn chain_tree_name(node_id: &str) -> Vec<u8> {
        format!("chain:{node_id}").into_bytes()
    }

    // Helper: key for a block inside a chain tree
    fn block_key(index: u64) -> Vec<u8> {
        index.to_be_bytes().to_vec()
    }
}

impl ChainStore for ChainDb {
    fn load_chain_for_node(&self, node_id: &str) -> Result<Option<Vec<Block>>> {
        let tree = self.chain_tree(node_id)?;
        if tree.is_empty() {
            return Ok(None);
        }

        let mut blocks = Vec::with_capacity(tree.len());
        for item in tree.iter() {
            let (_, value) = item?;
            blocks.push(serde_json::from_slice(&value)?);
        }

        Ok(Some(blocks))
    }

    fn save_new_chain(&self, chain: &[Block], node_id: &str) -> Result<()> {
        let tree = self.chain_tree(node_id)?;
        tree.clear()?;

        let mut batch = sled::Batch::default();
        for block in chain {
            batch.insert(Self::block_key(block.index), serde_json::to_vec(block)?);
        }
        tree.apply_batch(batch)?;
        tree.flush()?;

        log::debug!("Saved chain of {} block(s) for node {}", chain.len(), node_id);
        Ok(())
    }

    fn append_block(&self, block: &Block, node_id: &str) -> Result<()> {
        let tree = self.chain_tree(node_id)?;
        tree.insert(Self::block_key(block.index), serde_json::to_vec(block)?)?;
        tree.flush()?;
        Ok(())
    }

    fn delete_chain(&self, node_id: &str) -> Result<()> {
        self.db.drop_tree(Self::chain_tree_name(node_id))?;
        Ok(())
    }

    fn load_known_peers(&self) -> Result<BTreeSet<String>> {
        match self.db.get(PEERS_KEY)? {
            Some(data) => Ok(serde_json::from_slice(&data)?),
            None => Ok(BTreeSet::new()),
        }
    }

    fn record_peers(&self, peers: &BTreeSet<String>) -> Result<()> {
        self.db.insert(PEERS_KEY, serde_json::to_vec(peers)?)?;
        self.db.flush()?;
        Ok(())
    }
}
