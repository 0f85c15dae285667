// Network node - owns the chain, the UTXO ledger and the peer set

use crate::config::NodeConfig;
use crate::consensus::{ConsensusResolver, Miner, MiningControl, ValidationError};
use crate::core::{Block, Blockchain, Identity, Transaction, TxRecord, TxSequence};
use crate::error::{LedgerError, Result};
use crate::network::registry::{PeerRegistry, probe_address};
use crate::network::transport::PeerTransport;
use crate::network::{Message, Peer, RemoteChain};
use crate::storage::{ChainStore, UtxoLedger};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Network node
///
/// Every shared structure sits behind its own lock. When both the chain
/// and the ledger are needed the chain lock is taken first.
pub struct Node<S, T> {
    config: Arc<NodeConfig>,
    /// Identity credited with the genesis amount and mining rewards
    identity: Identity,
    store: Arc<S>,
    transport: Arc<T>,
    chain: Arc<RwLock<Blockchain>>,
    ledger: Arc<Mutex<UtxoLedger>>,
    sequence: Arc<TxSequence>,
    peers: Arc<RwLock<PeerRegistry>>,
    miner: Miner,
}

impl<S, T> Clone for Node<S, T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            identity: self.identity.clone(),
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            chain: Arc::clone(&self.chain),
            ledger: Arc::clone(&self.ledger),
            sequence: Arc::clone(&self.sequence),
            peers: Arc::clone(&self.peers),
            miner: self.miner.clone(),
        }
    }
}

impl<S: ChainStore, T: PeerTransport> Node<S, T> {
    /// Load the node's chain from the store, or start a fresh one
    ///
    /// A fresh chain's genesis block mints `genesis_amount` to `identity`.
    pub fn open(config: NodeConfig, store: S, transport: T, identity: Identity) -> Result<Self> {
        config.validate()?;

        match store.load_chain_for_node(&config.node_id)? {
            Some(blocks) => {
                log::info!(
                    "Loaded chain of {} block(s) for node {}",
                    blocks.len(),
                    config.node_id
                );
                Self::from_parts(config, store, transport, identity, blocks)
            }
            None => {
                let mut ledger = UtxoLedger::new();
                let sequence = TxSequence::new();
                let mut genesis_tx =
                    Transaction::new(Identity::mint(), identity.clone(), config.genesis_amount);
                genesis_tx.process(&mut ledger, &sequence)?;

                let chain = Blockchain::with_genesis(vec![applied_record(&genesis_tx)?])?;
                store.save_new_chain(chain.blocks(), &config.node_id)?;
                log::info!(
                    "Created genesis block for node {}, {} minted to {}",
                    config.node_id,
                    config.genesis_amount,
                    identity
                );

                let peers = PeerRegistry::from_peers(store.load_known_peers()?);
                Ok(Self::assemble(config, store, transport, identity, chain, ledger, sequence, peers))
            }
        }
    }

    /// Start from a given chain, replacing whatever the store held for this node
    pub fn with_chain(
        config: NodeConfig,
        store: S,
        transport: T,
        identity: Identity,
        blocks: Vec<Block>,
    ) -> Result<Self> {
        config.validate()?;
        store.save_new_chain(&blocks, &config.node_id)?;
        Self::from_parts(config, store, transport, identity, blocks)
    }

    fn from_parts(
        config: NodeConfig,
        store: S,
        transport: T,
        identity: Identity,
        blocks: Vec<Block>,
    ) -> Result<Self> {
        let chain = Blockchain::from_blocks(blocks)?;

        let mut ledger = UtxoLedger::new();
        ledger.rebuild_from_chain(chain.blocks());

        // Ids issued after a restart must not repeat the committed ones
        let sequence = TxSequence::starting_at(chain.committed_transactions() as u64);

        let peers = PeerRegistry::from_peers(store.load_known_peers()?);
        Ok(Self::assemble(config, store, transport, identity, chain, ledger, sequence, peers))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        config: NodeConfig,
        store: S,
        transport: T,
        identity: Identity,
        chain: Blockchain,
        ledger: UtxoLedger,
        sequence: TxSequence,
        peers: PeerRegistry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            identity,
            store: Arc::new(store),
            transport: Arc::new(transport),
            chain: Arc::new(RwLock::new(chain)),
            ledger: Arc::new(Mutex::new(ledger)),
            sequence: Arc::new(sequence),
            peers: Arc::new(RwLock::new(peers)),
            miner: Miner::new(),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Apply a transaction to the ledger and queue it for the next block
    /// Returns the index of the block that will hold it.
    pub async fn submit_transaction(&self, mut tx: Transaction) -> Result<u64> {
        let mut chain = self.chain.write().await;
        let mut ledger = self.ledger.lock().await;

        tx.process(&mut ledger, &self.sequence)?;
        let record = applied_record(&tx)?;
        log::debug!("Queued transaction {}", record.id);

        Ok(chain.queue(record))
    }

    /// Mine a block on top of the current tip
    ///
    /// The search runs on the blocking pool. If the tip changes while it
    /// runs (consensus replaced the chain, or another mining run finished
    /// first) the proof is stale and the search restarts against the new
    /// tip. Returns `None` when `control` stops the search.
    pub async fn mine(&self, control: MiningControl) -> Result<Option<Block>> {
        loop {
            let (last_proof, tip_hash) = {
                let chain = self.chain.read().await;
                let last = chain
                    .last_block()
                    .ok_or(LedgerError::ChainValidation(ValidationError::EmptyChain))?;
                (last.proof, last.hash()?)
            };

            let miner = self.miner.clone();
            let run_control = control.clone();
            let found = tokio::task::spawn_blocking(move || miner.mine(last_proof, &run_control))
                .await
                .map_err(|e| LedgerError::Io(format!("Mining task failed: {e}")))?;

            let Some(result) = found else {
                log::info!("Mining on top of proof {} was stopped", last_proof);
                return Ok(None);
            };

            let mut chain = self.chain.write().await;
            let current_tip = match chain.last_block() {
                Some(last) => last.hash()?,
                None => return Err(ValidationError::EmptyChain.into()),
            };
            if current_tip != tip_hash {
                log::info!("Chain tip moved while mining, restarting");
                continue;
            }

            log::debug!(
                "Found proof {} after {} attempts ({:.0} H/s)",
                result.proof,
                result.attempts,
                result.hash_rate()
            );

            // The reward goes into a copy of the ledger so that a failed
            // write leaves memory exactly as the store has it
            let mut ledger = self.ledger.lock().await;
            let mut staged = None;
            let mut extra = Vec::new();
            if self.config.mining_reward > 0.0 {
                let mut next_ledger = ledger.clone();
                let mut reward = Transaction::new(
                    Identity::mint(),
                    self.identity.clone(),
                    self.config.mining_reward,
                );
                reward.process(&mut next_ledger, &self.sequence)?;
                extra.push(applied_record(&reward)?);
                staged = Some(next_ledger);
            }

            let block = chain.next_block(result.proof, &extra)?;
            self.store.append_block(&block, &self.config.node_id)?;

            if let Some(next_ledger) = staged {
                *ledger = next_ledger;
            }
            return Ok(Some(chain.commit_block(block).clone()));
        }
    }

    /// Mine with the configured deadline, if any
    pub async fn mine_block(&self) -> Result<Option<Block>> {
        let control = match self.config.mining_deadline {
            Some(limit) => MiningControl::with_deadline(limit),
            None => MiningControl::new(),
        };
        self.mine(control).await
    }

    /// Snapshot of the chain
    pub async fn chain(&self) -> Vec<Block> {
        self.chain.read().await.blocks().to_vec()
    }

    pub async fn chain_len(&self) -> usize {
        self.chain.read().await.len()
    }

    /// Transactions waiting for the next block
    pub async fn pending(&self) -> Vec<TxRecord> {
        self.chain.read().await.pending().to_vec()
    }

    pub async fn balance_of(&self, identity: &Identity) -> f64 {
        self.ledger.lock().await.balance_of(identity)
    }

    /// Copy of the UTXO ledger, e.g. for building transactions
    pub async fn ledger_snapshot(&self) -> UtxoLedger {
        self.ledger.lock().await.clone()
    }

    pub async fn peers(&self) -> Vec<String> {
        self.peers.read().await.addresses()
    }

    /// Probe and record one peer address
    pub async fn register_peer(&self, address: &str) -> Result<bool> {
        // Probe before taking the lock so a slow peer doesn't block readers
        let Some(netloc) = probe_address(address, self.transport.as_ref()).await else {
            return Ok(false);
        };

        let mut peers = self.peers.write().await;
        if peers.admit(netloc) {
            self.store.record_peers(peers.peers())?;
        }
        Ok(true)
    }

    /// Register several addresses; returns the full peer list afterwards
    pub async fn register_peers(&self, addresses: &[String]) -> Result<Vec<String>> {
        for address in addresses {
            self.register_peer(address).await?;
        }
        Ok(self.peers().await)
    }

    /// Adopt the longest valid chain among the peers
    ///
    /// Chains are fetched without holding any lock; the swap itself happens
    /// under the chain write lock, so readers see either the old chain or
    /// the new one. Pending transactions are dropped on replacement and the
    /// ledger is rebuilt from the adopted chain.
    pub async fn run_consensus(&self) -> Result<bool> {
        let peers = self.peers().await;
        let local = self.chain().await;

        let resolver =
            ConsensusResolver::new(Arc::clone(&self.transport), self.config.consensus_timeout);
        let resolution = resolver.resolve(&local, &peers).await;

        let Some(new_chain) = resolution.new_chain else {
            log::debug!("Local chain of {} block(s) is authoritative", local.len());
            return Ok(false);
        };

        let mut chain = self.chain.write().await;
        if new_chain.len() <= chain.len() {
            log::info!("Local chain grew during consensus, keeping it");
            return Ok(false);
        }

        // Persist first; a failed write keeps the local chain in place
        self.store.save_new_chain(&new_chain, &self.config.node_id)?;

        let mut ledger = self.ledger.lock().await;
        let dropped = chain.replace(new_chain)?;
        ledger.rebuild_from_chain(chain.blocks());
        // Replayed records keep their committed ids; new ones must not reuse them
        self.sequence.advance_to(chain.committed_transactions() as u64);

        log::info!(
            "Replaced local chain with {} block(s), dropped {} pending transaction(s)",
            chain.len(),
            dropped.len()
        );
        Ok(resolution.replaced)
    }

    /// Run consensus every `interval` in the background
    pub fn spawn_consensus_loop(&self, interval: Duration) -> JoinHandle<()> {
        let node = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = node.run_consensus().await {
                    log::error!("Consensus round failed: {}", e);
                }
            }
        })
    }

    /// Bind the configured address and answer chain requests
    pub async fn serve(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|e| LedgerError::Io(format!("Failed to bind {}: {e}", self.config.listen_addr)))?;
        self.serve_on(listener).await
    }

    /// Answer chain requests and transaction submissions on an already bound listener
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        log::info!("Node {} listening on {}", self.config.node_id, listener.local_addr()?);

        loop {
            let (stream, addr) = listener.accept().await?;
            log::debug!("New connection from {}", addr);

            let node = self.clone();
            tokio::spawn(async move {
                if let Err(e) = node.handle_connection(stream, addr).await {
                    log::debug!("Connection {} closed: {}", addr, e);
                }
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) -> Result<()> {
        let mut peer = Peer::new(stream, addr.to_string());

        loop {
            match peer.receive_message().await? {
                Message::GetChain => {
                    let reply = Message::Chain(RemoteChain::new(self.chain().await));
                    peer.send_message(&reply).await?;
                }
                Message::Submit(request) => {
                    let submitted = match request.into_transaction() {
                        Ok(tx) => self.submit_transaction(tx).await,
                        Err(e) => Err(e),
                    };
                    let reply = match submitted {
                        Ok(index) => Message::Accepted(index),
                        Err(e) => {
                            log::info!("Refused transaction from {}: {}", addr, e);
                            Message::Rejected(e.to_string())
                        }
                    };
                    peer.send_message(&reply).await?;
                }
                other => {
                    log::warn!(
                        "Unexpected {:?} message from {}",
                        other.message_type(),
                        addr
                    );
                }
            }
        }
    }
}

fn applied_record(tx: &Transaction) -> Result<TxRecord> {
    tx.record().ok_or_else(|| {
        LedgerError::TransactionRejected("transaction has not been applied".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::valid_chain;
    use crate::core::generate_keypair;
    use secp256k1::SecretKey;
    use crate::network::transport::stub::StubTransport;
    use crate::storage::ChainDb;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Sled store whose next block append can be made to fail
    struct FlakyStore {
        inner: ChainDb,
        fail_next_append: AtomicBool,
    }

    impl FlakyStore {
        fn failing_once() -> Self {
            Self {
                inner: ChainDb::memory().unwrap(),
                fail_next_append: AtomicBool::new(true),
            }
        }
    }

    impl ChainStore for FlakyStore {
        fn load_chain_for_node(&self, node_id: &str) -> Result<Option<Vec<Block>>> {
            self.inner.load_chain_for_node(node_id)
        }

        fn save_new_chain(&self, chain: &[Block], node_id: &str) -> Result<()> {
            self.inner.save_new_chain(chain, node_id)
        }

        fn append_block(&self, block: &Block, node_id: &str) -> Result<()> {
            if self.fail_next_append.swap(false, Ordering::SeqCst) {
                return Err(LedgerError::Storage("disk full".to_string()));
            }
            self.inner.append_block(block, node_id)
        }

        fn delete_chain(&self, node_id: &str) -> Result<()> {
            self.inner.delete_chain(node_id)
        }

        fn load_known_peers(&self) -> Result<BTreeSet<String>> {
            self.inner.load_known_peers()
        }

        fn record_peers(&self, peers: &BTreeSet<String>) -> Result<()> {
            self.inner.record_peers(peers)
        }
    }

    fn open_node(transport: StubTransport) -> (Node<ChainDb, StubTransport>, Identity, SecretKey) {
        let (secret_key, public_key) = generate_keypair().unwrap();
        let identity = Identity::from_public_key(&public_key);
        let node = Node::open(
            NodeConfig::default(),
            ChainDb::memory().unwrap(),
            transport,
            identity.clone(),
        )
        .unwrap();
        (node, identity, secret_key)
    }

    fn extended(blocks: Vec<Block>, proof: u64) -> Vec<Block> {
        let mut chain = Blockchain::from_blocks(blocks).unwrap();
        chain.new_block(proof, None).unwrap();
        chain.blocks().to_vec()
    }

    #[tokio::test]
    async fn test_open_creates_genesis() {
        let (node, identity, _) = open_node(StubTransport::new());

        let chain = node.chain().await;
        assert_eq!(chain.len(), 1);
        assert!(chain[0].is_genesis());
        assert_eq!(chain[0].transactions.len(), 1);
        assert!(chain[0].transactions[0].sender.is_mint());
        assert_eq!(node.balance_of(&identity).await, 100.0);

        let stored = node.store.load_chain_for_node("localhost:5000").unwrap();
        assert_eq!(stored, Some(chain));
    }

    #[tokio::test]
    async fn test_open_loads_stored_chain() {
        let store = ChainDb::memory().unwrap();
        let identity = Identity::from("node");
        let genesis = Blockchain::with_genesis(vec![]).unwrap().blocks().to_vec();
        store.save_new_chain(&genesis, "localhost:5000").unwrap();

        let node = Node::open(NodeConfig::default(), store, StubTransport::new(), identity).unwrap();
        assert_eq!(node.chain().await, genesis);
    }

    #[tokio::test]
    async fn test_submit_and_mine() {
        let (node, identity, secret_key) = open_node(StubTransport::new());

        let mut tx = Transaction::new(identity.clone(), Identity::from("bob"), 100.0);
        tx.sign(&secret_key).unwrap();
        assert_eq!(node.submit_transaction(tx).await.unwrap(), 2);
        assert_eq!(node.pending().await.len(), 1);

        let block = node.mine(MiningControl::new()).await.unwrap().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.proof, 35293);
        // Submitted transaction plus the mining reward
        assert_eq!(block.transactions.len(), 2);
        assert!(node.pending().await.is_empty());

        let chain = node.chain().await;
        assert!(valid_chain(&chain));
        assert_eq!(node.balance_of(&Identity::from("bob")).await, 100.0);

        let stored = node.store.load_chain_for_node("localhost:5000").unwrap();
        assert_eq!(stored.map(|c| c.len()), Some(2));
    }

    #[tokio::test]
    async fn test_forged_transaction_rejected() {
        let (node, identity, _) = open_node(StubTransport::new());
        let (other_key, _) = generate_keypair().unwrap();

        let ledger = node.ledger_snapshot().await;
        let (inputs, _) = ledger.select_inputs(&identity, 10.0);
        let mut tx =
            Transaction::new(identity.clone(), Identity::from("mallory"), 10.0).with_inputs(inputs);
        tx.sign(&other_key).unwrap();

        assert!(matches!(
            node.submit_transaction(tx).await,
            Err(LedgerError::TransactionRejected(_))
        ));
        assert!(node.pending().await.is_empty());
        assert_eq!(node.balance_of(&identity).await, 100.0);
    }

    #[tokio::test]
    async fn test_cancelled_mining_leaves_chain() {
        let (node, _, _) = open_node(StubTransport::new());
        let control = MiningControl::new();
        control.cancel();

        assert!(node.mine(control).await.unwrap().is_none());
        assert_eq!(node.chain_len().await, 1);
    }

    #[tokio::test]
    async fn test_consensus_without_longer_chain_keeps_local() {
        let transport = StubTransport::new().reachable("b:1");
        let (node, _, _) = open_node(transport);
        node.register_peer("b:1").await.unwrap();

        let before = node.chain.read().await.blocks().as_ptr();
        assert!(!node.run_consensus().await.unwrap());
        let after = node.chain.read().await.blocks().as_ptr();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_consensus_adopts_longer_chain() {
        let store = ChainDb::memory().unwrap();
        let identity = Identity::from("a");
        let genesis = Blockchain::with_genesis(vec![]).unwrap().blocks().to_vec();
        let longer = extended(genesis.clone(), 35293);

        let transport = StubTransport::new()
            .reachable("b:1")
            .serving("b:1", RemoteChain::new(longer.clone()));
        let node = Node::with_chain(NodeConfig::default(), store, transport, identity, genesis)
            .unwrap();
        node.register_peer("http://b:1").await.unwrap();

        node.submit_transaction(Transaction::new(Identity::mint(), Identity::from("x"), 5.0))
            .await
            .unwrap();

        assert!(node.run_consensus().await.unwrap());
        assert_eq!(node.chain().await, longer);
        assert!(node.pending().await.is_empty());
        // Ledger now reflects only the adopted chain
        assert_eq!(node.balance_of(&Identity::from("x")).await, 0.0);

        let stored = node.store.load_chain_for_node("localhost:5000").unwrap();
        assert_eq!(stored, Some(longer));
    }

    #[tokio::test]
    async fn test_adopted_chain_ids_not_reused() {
        let mut ledger = UtxoLedger::new();
        let mut genesis_tx = Transaction::new(Identity::mint(), Identity::from("a"), 50.0);
        genesis_tx.process(&mut ledger, &TxSequence::new()).unwrap();
        let genesis = Blockchain::with_genesis(vec![genesis_tx.record().unwrap()])
            .unwrap()
            .blocks()
            .to_vec();

        // B mines on the shared genesis; its reward pays "b" 1.0
        let node_b = Node::with_chain(
            NodeConfig::default(),
            ChainDb::memory().unwrap(),
            StubTransport::new(),
            Identity::from("b"),
            genesis.clone(),
        )
        .unwrap();
        node_b.mine(MiningControl::new()).await.unwrap().unwrap();
        let longer = node_b.chain().await;
        let committed_id = longer[1].transactions[0].id.clone();

        let transport = StubTransport::new()
            .reachable("b:1")
            .serving("b:1", RemoteChain::new(longer));
        let node_a = Node::with_chain(
            NodeConfig::default(),
            ChainDb::memory().unwrap(),
            transport,
            Identity::from("a"),
            genesis,
        )
        .unwrap();
        node_a.register_peer("b:1").await.unwrap();
        assert!(node_a.run_consensus().await.unwrap());
        assert_eq!(node_a.sequence.peek(), 2);

        // Same content as B's reward: must land as a separate output
        let same = Transaction::new(Identity::mint(), Identity::from("b"), 1.0);
        node_a.submit_transaction(same).await.unwrap();

        let pending = node_a.pending().await;
        assert_ne!(pending[0].id, committed_id);
        assert_eq!(node_a.balance_of(&Identity::from("b")).await, 2.0);
    }

    #[tokio::test]
    async fn test_failed_block_write_leaves_memory_unchanged() {
        let (_, public_key) = generate_keypair().unwrap();
        let identity = Identity::from_public_key(&public_key);
        let node = Node::open(
            NodeConfig::default(),
            FlakyStore::failing_once(),
            StubTransport::new(),
            identity.clone(),
        )
        .unwrap();
        node.submit_transaction(Transaction::new(Identity::mint(), Identity::from("bob"), 5.0))
            .await
            .unwrap();

        let result = node.mine(MiningControl::new()).await;
        assert!(matches!(result, Err(LedgerError::Storage(_))));
        assert_eq!(node.chain_len().await, 1);
        assert_eq!(node.pending().await.len(), 1);
        // No reward credited for a block that was never stored
        assert_eq!(node.balance_of(&identity).await, 100.0);

        let block = node.mine(MiningControl::new()).await.unwrap().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(node.balance_of(&identity).await, 101.0);

        let stored = node.store.load_chain_for_node("localhost:5000").unwrap().unwrap();
        let indexes: Vec<u64> = stored.iter().map(|b| b.index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert!(valid_chain(&stored));
        assert_eq!(stored, node.chain().await);
    }

    #[tokio::test]
    async fn test_register_peers_persists() {
        let transport = StubTransport::new().reachable("127.0.0.1:5001");
        let (node, _, _) = open_node(transport);

        let peers = node
            .register_peers(&["http://127.0.0.1:5001".to_string(), "127.0.0.1:5002".to_string()])
            .await
            .unwrap();

        assert_eq!(peers, vec!["127.0.0.1:5001".to_string()]);
        let stored = node.store.load_known_peers().unwrap();
        assert!(stored.contains("127.0.0.1:5001"));
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_sequence_resumes_after_load() {
        let store = ChainDb::memory().unwrap();
        let mut ledger = UtxoLedger::new();
        let sequence = TxSequence::new();
        let mut genesis_tx = Transaction::new(Identity::mint(), Identity::from("a"), 50.0);
        genesis_tx.process(&mut ledger, &sequence).unwrap();
        let genesis = Blockchain::with_genesis(vec![genesis_tx.record().unwrap()])
            .unwrap()
            .blocks()
            .to_vec();

        let node = Node::with_chain(
            NodeConfig::default(),
            store,
            StubTransport::new(),
            Identity::from("a"),
            genesis,
        )
        .unwrap();

        assert_eq!(node.sequence.peek(), 1);
        assert_eq!(node.balance_of(&Identity::from("a")).await, 50.0);

        // The same content gets a different id than the committed genesis record
        let again = Transaction::new(Identity::mint(), Identity::from("a"), 50.0);
        node.submit_transaction(again).await.unwrap();
        let pending = node.pending().await;
        assert_ne!(pending[0].id, genesis_tx.tx_id.clone().unwrap());
    }
}
