// Longest-valid-chain consensus

use crate::consensus::validation::validate_chain;
use crate::core::Block;
use crate::error::{LedgerError, Result};
use crate::network::{PeerTransport, RemoteChain};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};

/// Outcome of a consensus round
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The chain to adopt, if a longer valid one was found
    pub new_chain: Option<Vec<Block>>,
    pub replaced: bool,
}

impl Resolution {
    fn keep_local() -> Self {
        Self {
            new_chain: None,
            replaced: false,
        }
    }
}

/// Compares the local chain with the chains peers report
pub struct ConsensusResolver<T> {
    transport: Arc<T>,
    round_timeout: Duration,
}

impl<T: PeerTransport> ConsensusResolver<T> {
    /// `round_timeout` bounds the whole fetch phase of a round
    pub fn new(transport: Arc<T>, round_timeout: Duration) -> Self {
        Self {
            transport,
            round_timeout,
        }
    }

    /// Fetch every peer's chain concurrently
    /// Results come back in peer order; peers still outstanding when the
    /// round times out are reported unreachable.
    pub async fn fetch_all(&self, peers: &[String]) -> Vec<(String, Result<RemoteChain>)> {
        let deadline = Instant::now() + self.round_timeout;
        let mut fetches = JoinSet::new();

        for (i, peer) in peers.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let peer = peer.clone();
            fetches.spawn(async move { (i, transport.fetch_remote_chain(&peer).await) });
        }

        let mut results: Vec<Option<Result<RemoteChain>>> = vec![None; peers.len()];
        loop {
            let next = timeout_at(deadline, fetches.join_next()).await;
            match next {
                Ok(Some(Ok((i, result)))) => results[i] = Some(result),
                Ok(Some(Err(e))) => log::warn!("Chain fetch task failed: {}", e),
                Ok(None) => break,
                Err(_) => {
                    log::warn!(
                        "Consensus round timed out with {} fetch(es) outstanding",
                        fetches.len()
                    );
                    fetches.abort_all();
                    break;
                }
            }
        }

        peers
            .iter()
            .cloned()
            .zip(results)
            .map(|(peer, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(LedgerError::PeerUnreachable(format!("{peer}: no answer")))
                });
                (peer, result)
            })
            .collect()
    }

    /// Look for a strictly longer valid chain among the peers
    /// The local chain is only read; adopting the result is the caller's job.
    pub async fn resolve(&self, local: &[Block], peers: &[String]) -> Resolution {
        if peers.is_empty() {
            return Resolution::keep_local();
        }

        let candidates = self.fetch_all(peers).await;
        match select_longest(local.len(), candidates) {
            Some(chain) => Resolution {
                new_chain: Some(chain),
                replaced: true,
            },
            None => Resolution::keep_local(),
        }
    }
}

/// Pick the longest valid chain strictly longer than `local_len`
///
/// Candidates are scanned in order and the best length so far starts at the
/// local length, so ties keep the earlier chain. Failed fetches and replies
/// whose reported length disagrees with the chain they carry are skipped.
pub fn select_longest(
    local_len: usize,
    candidates: Vec<(String, Result<RemoteChain>)>,
) -> Option<Vec<Block>> {
    let mut max_length = local_len;
    let mut new_chain = None;

    for (peer, result) in candidates {
        let remote = match result {
            Ok(remote) => remote,
            Err(e) => {
                log::warn!("Skipping peer {}: {}", peer, e);
                continue;
            }
        };

        if remote.length != remote.chain.len() {
            log::warn!(
                "Skipping peer {}: reported length {} but sent {} block(s)",
                peer,
                remote.length,
                remote.chain.len()
            );
            continue;
        }

        if remote.length <= max_length {
            log::debug!("Peer {} chain length {} is not longer", peer, remote.length);
            continue;
        }

        match validate_chain(&remote.chain) {
            Ok(()) => {
                log::info!("Peer {} has a longer valid chain ({} blocks)", peer, remote.length);
                max_length = remote.length;
                new_chain = Some(remote.chain);
            }
            Err(e) => log::warn!("Discarding chain from peer {}: {}", peer, e),
        }
    }

    new_chain
}
