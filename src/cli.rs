// CLI commands

use crate::config::NodeConfig;
use crate::consensus::validate_chain;
use crate::core::{Block, Identity};
use crate::error::{LedgerError, Result};
use crate::network::{Node, Peer, RemoteChain, TcpTransport, join_host_port, parse_address};
use crate::storage::{ChainDb, ChainStore, UtxoLedger};
use crate::wallet::{Keystore, TransactionBuilder};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "utxo-ledger")]
#[command(about = "Educational UTXO ledger node", long_about = None)]
pub struct Cli {
    /// Directory holding the chain database and keystore
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Key under which this node's chain is stored
    #[arg(long, global = true)]
    pub node_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a node: serve the chain, optionally mine and reconcile with peers
    Run {
        /// Address to listen on (host:port)
        #[arg(short, long)]
        listen: Option<String>,

        /// Peer to register at startup (repeatable)
        #[arg(short, long = "peer")]
        peers: Vec<String>,

        /// Seconds between consensus rounds
        #[arg(long)]
        consensus_interval: Option<u64>,

        /// Mine blocks continuously
        #[arg(long)]
        mine: bool,

        /// Give up a single mining run after this many seconds
        #[arg(long)]
        mining_deadline: Option<u64>,
    },

    /// Generate a named key
    Keygen {
        name: String,
    },

    /// List keys in the keystore
    Keys,

    /// Make a key the default one
    SetDefault {
        name: String,
    },

    /// Sign a transfer and submit it to a running node
    Send {
        /// Recipient: a key name from the keystore or an identity
        to: String,

        amount: f64,

        /// Paying key (uses the default key if not specified)
        #[arg(long)]
        from: Option<String>,

        /// Node to submit to (defaults to the configured listen address)
        #[arg(long)]
        node: Option<String>,
    },

    /// Balance of a key according to the stored chain
    Balance {
        /// Key name (uses the default key if not specified)
        name: Option<String>,
    },

    /// Print the stored chain as JSON
    Chain,

    /// Check the stored chain's hash links and proofs
    Validate,
}

/// CLI handler
pub struct CliHandler {
    config: NodeConfig,
}

impl CliHandler {
    /// Environment settings with command-line overrides applied
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = NodeConfig::from_env()?;
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(id) = &cli.node_id {
            config.node_id = id.clone();
        }
        Ok(Self { config })
    }

    /// Handle CLI command
    pub async fn handle(mut self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Run {
                listen,
                peers,
                consensus_interval,
                mine,
                mining_deadline,
            } => {
                if let Some(addr) = listen {
                    if cli.node_id.is_none() {
                        self.config.node_id = addr.clone();
                    }
                    self.config.listen_addr = addr;
                }
                self.config.consensus_interval = consensus_interval.map(Duration::from_secs);
                self.config.mining_deadline = mining_deadline.map(Duration::from_secs);
                self.run(peers, mine).await
            }
            Commands::Keygen { name } => self.keygen(&name),
            Commands::Keys => self.keys(),
            Commands::SetDefault { name } => self.set_default(&name),
            Commands::Send {
                to,
                amount,
                from,
                node,
            } => self.send(&to, amount, from, node).await,
            Commands::Balance { name } => self.balance(name),
            Commands::Chain => self.print_chain(),
            Commands::Validate => self.validate(),
        }
    }

    async fn run(self, peers: Vec<String>, mine: bool) -> Result<()> {
        let keystore = Keystore::load_or_create(self.config.keystore_path())?;
        let identity = keystore
            .default_keypair()
            .ok_or_else(|| LedgerError::Config("Keystore has no default key".to_string()))?
            .identity
            .clone();

        let store = ChainDb::new(self.config.db_path())?;
        let transport = TcpTransport::new(self.config.probe_timeout, self.config.fetch_timeout);
        let consensus_interval = self.config.consensus_interval;
        let node = Node::open(self.config, store, transport, identity)?;

        println!("Node {} ({} blocks)", node.config().node_id, node.chain_len().await);
        println!("  Identity: {}", node.identity());

        if !peers.is_empty() {
            let known = node.register_peers(&peers).await?;
            println!("  Peers: {}", known.join(", "));
        }

        if let Some(interval) = consensus_interval {
            node.spawn_consensus_loop(interval);
        }

        if mine {
            let miner = node.clone();
            tokio::spawn(async move {
                loop {
                    match miner.mine_block().await {
                        Ok(Some(block)) => log::info!("Mined block {} (proof {})", block.index, block.proof),
                        Ok(None) => log::debug!("Mining run ended without a proof"),
                        Err(e) => {
                            log::error!("Mining failed: {}", e);
                            break;
                        }
                    }
                }
            });
        }

        node.serve().await
    }

    fn keygen(&self, name: &str) -> Result<()> {
        let path = self.config.keystore_path();
        let mut keystore = if path.exists() {
            Keystore::load(&path)?
        } else {
            Keystore::new()
        };

        let identity = keystore.generate(name)?;
        keystore.save(&path)?;

        println!("Generated key {}", name);
        println!("  Identity: {}", identity);
        Ok(())
    }

    fn keys(&self) -> Result<()> {
        let keystore = Keystore::load(self.config.keystore_path())?;
        let default = keystore.default_name();

        println!("Keys ({}):", keystore.count());
        for name in keystore.names() {
            let marker = if Some(name.as_str()) == default { "*" } else { " " };
            if let Some(kp) = keystore.get(&name) {
                println!(" {} {} {}", marker, name, kp.identity);
            }
        }
        Ok(())
    }

    fn set_default(&self, name: &str) -> Result<()> {
        let path = self.config.keystore_path();
        let mut keystore = Keystore::load(&path)?;
        keystore.set_default(name)?;
        keystore.save(&path)?;

        println!("Default key is now {}", name);
        Ok(())
    }

    async fn send(
        &self,
        to: &str,
        amount: f64,
        from: Option<String>,
        node: Option<String>,
    ) -> Result<()> {
        let keystore = Keystore::load(self.config.keystore_path())?;
        let from = key_name(&keystore, from)?;
        let recipient = match keystore.get(to) {
            Some(kp) => kp.identity.clone(),
            None => Identity::from(to),
        };

        let (host, port) = parse_address(node.as_deref().unwrap_or(&self.config.listen_addr))?;
        let mut peer = Peer::connect(&join_host_port(&host, port)).await?;

        // Inputs are chosen against the node's committed chain
        let remote = peer.request_chain().await?;
        let mut ledger = UtxoLedger::new();
        ledger.rebuild_from_chain(&remote.chain);

        let tx = TransactionBuilder::new(&keystore, &ledger).build(&from, &recipient, amount)?;
        let index = peer.submit_transaction(&tx).await?;

        println!("Sent {} from {} to {}", amount, from, recipient);
        println!("  Queued for block {}", index);
        Ok(())
    }

    fn balance(&self, name: Option<String>) -> Result<()> {
        let keystore = Keystore::load(self.config.keystore_path())?;
        let name = key_name(&keystore, name)?;

        let mut ledger = UtxoLedger::new();
        ledger.rebuild_from_chain(&self.load_chain()?);

        let balance = TransactionBuilder::new(&keystore, &ledger).balance(&name)?;
        println!("Balance for {}: {}", name, balance);
        Ok(())
    }

    fn print_chain(&self) -> Result<()> {
        let remote = RemoteChain::new(self.load_chain()?);
        println!("{}", serde_json::to_string_pretty(&remote)?);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let chain = self.load_chain()?;
        validate_chain(&chain)?;
        println!("Chain of {} block(s) is valid", chain.len());
        Ok(())
    }

    fn load_chain(&self) -> Result<Vec<Block>> {
        let store = ChainDb::new(self.config.db_path())?;
        store
            .load_chain_for_node(&self.config.node_id)?
            .ok_or_else(|| {
                LedgerError::Storage(format!("No chain stored for node {}", self.config.node_id))
            })
    }
}

// The named key, or the keystore's default
fn key_name(keystore: &Keystore, name: Option<String>) -> Result<String> {
    match name {
        Some(name) => Ok(name),
        None => keystore
            .default_name()
            .map(str::to_string)
            .ok_or_else(|| LedgerError::Config("Keystore has no default key".to_string())),
    }
}
