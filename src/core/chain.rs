// Chain of blocks plus the queue of transactions awaiting a block

use crate::core::{Block, PreviousHash, TxRecord};
use crate::error::{LedgerError, Result};

/// Proof recorded in the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Append-only, hash-linked chain
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pending: Vec<TxRecord>,
}

impl Blockchain {
    /// Start a chain whose genesis block commits the given transactions
    pub fn with_genesis(genesis_txs: Vec<TxRecord>) -> Result<Self> {
        let mut chain = Self {
            blocks: Vec::new(),
            pending: genesis_txs,
        };
        chain.new_block(GENESIS_PROOF, Some(PreviousHash::Genesis))?;
        Ok(chain)
    }

    /// Wrap an existing (loaded or fetched) list of blocks
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(LedgerError::ChainValidation(
                crate::consensus::ValidationError::EmptyChain,
            ));
        }
        Ok(Self {
            blocks,
            pending: Vec::new(),
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Transactions waiting for the next block
    pub fn pending(&self) -> &[TxRecord] {
        &self.pending
    }

    /// Queue an applied transaction; returns the index of the block that will hold it
    pub fn queue(&mut self, record: TxRecord) -> u64 {
        self.pending.push(record);
        self.blocks.len() as u64 + 1
    }

    /// Seal the pending transactions into a new block and append it
    ///
    /// `previous_hash` defaults to the canonical hash of the current last
    /// block. The pending queue is emptied in the same step, so a
    /// transaction is never both pending and committed.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<PreviousHash>) -> Result<&Block> {
        let block = self.build_block(proof, previous_hash, &[])?;
        Ok(self.commit_block(block))
    }

    /// Build the block that would follow the tip without appending it
    ///
    /// It holds the pending transactions followed by `extra`. Nothing
    /// changes until the block is handed to [`Blockchain::commit_block`].
    pub fn next_block(&self, proof: u64, extra: &[TxRecord]) -> Result<Block> {
        self.build_block(proof, None, extra)
    }

    /// Append a block built by [`Blockchain::next_block`] and clear the pending queue
    pub fn commit_block(&mut self, block: Block) -> &Block {
        self.pending.clear();

        log::info!(
            "Appended block {} with {} transaction(s), merkle root {}",
            block.index,
            block.transactions.len(),
            block.merkle_root
        );

        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    fn build_block(
        &self,
        proof: u64,
        previous_hash: Option<PreviousHash>,
        extra: &[TxRecord],
    ) -> Result<Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => {
                let last = self.blocks.last().ok_or_else(|| {
                    LedgerError::ChainValidation(crate::consensus::ValidationError::EmptyChain)
                })?;
                PreviousHash::Hash(last.hash()?)
            }
        };

        let index = self.blocks.len() as u64 + 1;
        let mut transactions = self.pending.clone();
        transactions.extend_from_slice(extra);
        Ok(Block::new(index, transactions, proof, previous_hash))
    }

    /// Swap in a whole new list of blocks
    /// Returns the pending transactions that were dropped.
    pub fn replace(&mut self, blocks: Vec<Block>) -> Result<Vec<TxRecord>> {
        if blocks.is_empty() {
            return Err(LedgerError::ChainValidation(
                crate::consensus::ValidationError::EmptyChain,
            ));
        }
        self.blocks = blocks;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Number of transaction records committed across all blocks
    pub fn committed_transactions(&self) -> usize {
        self.blocks.iter().map(|b| b.transactions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Identity;

    fn record(id: &str) -> TxRecord {
        TxRecord {
            id: id.to_string(),
            sender: Identity::mint(),
            recipient: Identity::from("alice"),
            amount: 100.0,
        }
    }

    #[test]
    fn test_genesis_block() {
        let chain = Blockchain::with_genesis(vec![record("g")]).unwrap();

        assert_eq!(chain.len(), 1);
        let genesis = chain.last_block().unwrap();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert!(genesis.is_genesis());
        assert_eq!(genesis.merkle_root, "g");
        assert!(chain.pending().is_empty());
    }

    #[test]
    fn test_new_block_links_to_previous() {
        let mut chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        let genesis_hash = chain.blocks()[0].hash().unwrap();

        assert_eq!(chain.queue(record("t1")), 2);
        assert_eq!(chain.pending().len(), 1);

        let block = chain.new_block(42, None).unwrap().clone();
        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 42);
        assert!(block.previous_hash.matches(&genesis_hash));
        assert_eq!(block.transactions, vec![record("t1")]);
        assert!(chain.pending().is_empty());
    }

    #[test]
    fn test_previous_hash_override() {
        let mut chain = Blockchain::with_genesis(vec![]).unwrap();
        let block = chain
            .new_block(7, Some(PreviousHash::Hash("override".to_string())))
            .unwrap();
        assert!(block.previous_hash.matches("override"));
    }

    #[test]
    fn test_next_block_leaves_chain_until_committed() {
        let mut chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        chain.queue(record("t1"));

        let block = chain.next_block(42, &[record("reward")]).unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions, vec![record("t1"), record("reward")]);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.pending(), &[record("t1")]);

        let committed = chain.commit_block(block.clone());
        assert_eq!(committed, &block);
        assert_eq!(chain.len(), 2);
        assert!(chain.pending().is_empty());
    }

    #[test]
    fn test_replace_drops_pending() {
        let mut chain = Blockchain::with_genesis(vec![record("g")]).unwrap();
        chain.queue(record("t1"));

        let other = Blockchain::with_genesis(vec![record("h")]).unwrap();
        let dropped = chain.replace(other.blocks().to_vec()).unwrap();

        assert_eq!(dropped, vec![record("t1")]);
        assert_eq!(chain.blocks()[0].merkle_root, "h");
        assert!(chain.replace(Vec::new()).is_err());
    }

    #[test]
    fn test_from_blocks_rejects_empty() {
        assert!(Blockchain::from_blocks(Vec::new()).is_err());
    }
}
