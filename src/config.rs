// Node configuration

use crate::error::{LedgerError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one running node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Key under which this node's chain is persisted
    pub node_id: String,
    /// Address the chain server listens on
    pub listen_addr: String,
    pub data_dir: PathBuf,
    /// Value minted to the node identity in a fresh genesis block
    pub genesis_amount: f64,
    /// Reward queued for the node identity after each mined block (0 disables)
    pub mining_reward: f64,
    /// Give up a mining run after this long
    pub mining_deadline: Option<Duration>,
    /// Per-peer chain fetch timeout
    pub fetch_timeout: Duration,
    /// Reachability probe timeout
    pub probe_timeout: Duration,
    /// Overall bound on one consensus round
    pub consensus_timeout: Duration,
    /// Run consensus periodically when set
    pub consensus_interval: Option<Duration>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "localhost:5000".to_string(),
            listen_addr: "127.0.0.1:5000".to_string(),
            data_dir: PathBuf::from("./data"),
            genesis_amount: 100.0,
            mining_reward: 1.0,
            mining_deadline: None,
            fetch_timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
            consensus_timeout: Duration::from_secs(15),
            consensus_interval: None,
        }
    }
}

impl NodeConfig {
    /// Defaults with `NODE_ADDRESS`, `NODE_ID` and `DATA_DIR` applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    // Split out so tests don't have to touch the process environment
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(addr) = lookup("NODE_ADDRESS") {
            if !addr.contains(':') {
                return Err(LedgerError::Config(format!(
                    "NODE_ADDRESS must be host:port, got {addr}"
                )));
            }
            // The node id follows the address unless set explicitly
            self.node_id = addr.clone();
            self.listen_addr = addr;
        }
        if let Some(id) = lookup("NODE_ID") {
            self.node_id = id;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Where the sled database lives
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("chain.db")
    }

    /// Where the keystore file lives
    pub fn keystore_path(&self) -> PathBuf {
        self.data_dir.join("keystore.json")
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            return Err(LedgerError::Config("node id must not be empty".to_string()));
        }
        if !(self.genesis_amount.is_finite() && self.genesis_amount >= 0.0) {
            return Err(LedgerError::Config(format!(
                "genesis amount must be non-negative, got {}",
                self.genesis_amount
            )));
        }
        if !(self.mining_reward.is_finite() && self.mining_reward >= 0.0) {
            return Err(LedgerError::Config(format!(
                "mining reward must be non-negative, got {}",
                self.mining_reward
            )));
        }
        Ok(())
    }
}
