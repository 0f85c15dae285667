// Peer registry - the set of nodes this node reconciles with

use crate::error::{LedgerError, Result};
use crate::network::transport::PeerTransport;
use std::collections::BTreeSet;

/// Split an address into host and port
///
/// Accepts `host:port` or a URL such as `http://192.168.0.5:5000/`; any
/// scheme, path or query is discarded. IPv6 literals are written in
/// brackets (`[::1]:5000`) and come back without them.
pub fn parse_address(address: &str) -> Result<(String, u16)> {
    let without_scheme = address
        .split_once("://")
        .map_or(address, |(_, rest)| rest);
    let netloc = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    let (host, port) = match netloc.strip_prefix('[') {
        Some(bracketed) => {
            let (host, rest) = bracketed.split_once(']').ok_or_else(|| {
                LedgerError::InvalidAddress(format!("{address}: unclosed bracket"))
            })?;
            let port = rest
                .strip_prefix(':')
                .ok_or_else(|| LedgerError::InvalidAddress(format!("{address}: missing port")))?;
            (host, port)
        }
        None => netloc
            .rsplit_once(':')
            .ok_or_else(|| LedgerError::InvalidAddress(format!("{address}: missing port")))?,
    };
    if host.is_empty() {
        return Err(LedgerError::InvalidAddress(format!("{address}: missing host")));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| LedgerError::InvalidAddress(format!("{address}: {e}")))?;

    Ok((host.to_string(), port))
}

/// Resolve an address to its `host:port` form if it answers a probe
pub async fn probe_address<T: PeerTransport>(address: &str, transport: &T) -> Option<String> {
    let (host, port) = match parse_address(address) {
        Ok(parts) => parts,
        Err(e) => {
            log::warn!("Not registering peer: {}", e);
            return None;
        }
    };

    let netloc = join_host_port(&host, port);
    if transport.probe_reachable(&host, port).await {
        Some(netloc)
    } else {
        log::warn!("Not registering peer {}: unreachable", netloc);
        None
    }
}

/// `host:port`, bracketing IPv6 hosts so the result parses and connects again
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Known peers, stored as `host:port`
/// Peers are never evicted automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_peers(peers: BTreeSet<String>) -> Self {
        Self { peers }
    }

    /// Probe the address and record it when reachable
    pub async fn register<T: PeerTransport>(&mut self, address: &str, transport: &T) -> bool {
        match probe_address(address, transport).await {
            Some(netloc) => {
                self.admit(netloc);
                true
            }
            None => false,
        }
    }

    /// Record an already probed `host:port`; returns true if it was new
    pub fn admit(&mut self, netloc: String) -> bool {
        let added = self.peers.insert(netloc.clone());
        if added {
            log::info!("Registered peer {} ({} known)", netloc, self.peers.len());
        }
        added
    }

    pub fn peers(&self) -> &BTreeSet<String> {
        &self.peers
    }

    /// Snapshot of the peer addresses
    pub fn addresses(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn contains(&self, netloc: &str) -> bool {
        self.peers.contains(netloc)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::transport::stub::StubTransport;

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(
            parse_address("http://192.168.0.5:5000").unwrap(),
            ("192.168.0.5".to_string(), 5000)
        );
        assert_eq!(
            parse_address("localhost:5001/chain?x=1").unwrap(),
            ("localhost".to_string(), 5001)
        );
        assert!(parse_address("localhost").is_err());
        assert!(parse_address("http://:5000").is_err());
        assert!(parse_address("host:notaport").is_err());
        assert!(parse_address("host:70000").is_err());
    }

    #[test]
    fn test_parse_ipv6_literal() {
        assert_eq!(parse_address("[::1]:5000").unwrap(), ("::1".to_string(), 5000));
        assert_eq!(
            parse_address("http://[fe80::1]:5001/chain").unwrap(),
            ("fe80::1".to_string(), 5001)
        );
        assert!(parse_address("[::1]").is_err());
        assert!(parse_address("[::1:5000").is_err());
        assert!(parse_address("[]:5000").is_err());

        assert_eq!(join_host_port("::1", 5000), "[::1]:5000");
        assert_eq!(join_host_port("localhost", 5000), "localhost:5000");
    }

    #[tokio::test]
    async fn test_register_ipv6_peer() {
        let transport = StubTransport::new().reachable("[::1]:5001");
        let mut registry = PeerRegistry::new();

        assert!(registry.register("http://[::1]:5001/", &transport).await);
        assert!(registry.contains("[::1]:5001"));
    }

    #[tokio::test]
    async fn test_register_reachable_peer() {
        let transport = StubTransport::new().reachable("127.0.0.1:5001");
        let mut registry = PeerRegistry::new();

        assert!(registry.register("http://127.0.0.1:5001", &transport).await);
        assert!(registry.contains("127.0.0.1:5001"));
        assert_eq!(registry.len(), 1);

        // Registering again keeps a single entry
        assert!(registry.register("127.0.0.1:5001", &transport).await);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_peer_not_recorded() {
        let transport = StubTransport::new();
        let mut registry = PeerRegistry::new();

        assert!(!registry.register("http://127.0.0.1:5009", &transport).await);
        assert!(!registry.register("garbage", &transport).await);
        assert!(registry.is_empty());
    }
}
