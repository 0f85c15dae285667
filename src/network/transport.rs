// Transport used to reach other nodes

use crate::error::{LedgerError, Result};
use crate::network::message::RemoteChain;
use crate::network::peer::Peer;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// How the node talks to its peers
pub trait PeerTransport: Send + Sync + 'static {
    /// Whether something accepts connections at `host:port`
    fn probe_reachable(&self, host: &str, port: u16) -> impl Future<Output = bool> + Send;

    /// Fetch a peer's chain together with the length it reports
    fn fetch_remote_chain(&self, peer: &str) -> impl Future<Output = Result<RemoteChain>> + Send;
}

/// TCP transport speaking the framed `getchain`/`chain` protocol
#[derive(Debug, Clone)]
pub struct TcpTransport {
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl TcpTransport {
    pub fn new(probe_timeout: Duration, fetch_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            fetch_timeout,
        }
    }
}

impl PeerTransport for TcpTransport {
    async fn probe_reachable(&self, host: &str, port: u16) -> bool {
        match timeout(self.probe_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::debug!("Probe of {}:{} failed: {}", host, port, e);
                false
            }
            Err(_) => {
                log::debug!("Probe of {}:{} timed out", host, port);
                false
            }
        }
    }

    async fn fetch_remote_chain(&self, peer: &str) -> Result<RemoteChain> {
        let fetch = async {
            let mut connection = Peer::connect(peer).await?;
            connection.request_chain().await
        };

        timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| LedgerError::PeerUnreachable(format!("{peer}: fetch timed out")))?
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use crate::network::registry::join_host_port;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory transport with canned answers
    #[derive(Default)]
    pub struct StubTransport {
        reachable: Mutex<HashSet<String>>,
        chains: Mutex<HashMap<String, Result<RemoteChain>>>,
        delays: Mutex<HashMap<String, Duration>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reachable(self, netloc: &str) -> Self {
            self.reachable.lock().unwrap().insert(netloc.to_string());
            self
        }

        pub fn serving(self, peer: &str, remote: RemoteChain) -> Self {
            self.chains.lock().unwrap().insert(peer.to_string(), Ok(remote));
            self
        }

        pub fn failing(self, peer: &str) -> Self {
            self.chains.lock().unwrap().insert(
                peer.to_string(),
                Err(LedgerError::PeerUnreachable(peer.to_string())),
            );
            self
        }

        pub fn delayed(self, peer: &str, delay: Duration) -> Self {
            self.delays.lock().unwrap().insert(peer.to_string(), delay);
            self
        }
    }

    impl PeerTransport for StubTransport {
        async fn probe_reachable(&self, host: &str, port: u16) -> bool {
            self.reachable
                .lock()
                .unwrap()
                .contains(&join_host_port(host, port))
        }

        async fn fetch_remote_chain(&self, peer: &str) -> Result<RemoteChain> {
            let delay = self.delays.lock().unwrap().get(peer).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.chains
                .lock()
                .unwrap()
                .get(peer)
                .cloned()
                .unwrap_or_else(|| Err(LedgerError::PeerUnreachable(peer.to_string())))
        }
    }
}
