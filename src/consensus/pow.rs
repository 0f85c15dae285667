// Proof of Work implementation

use crate::core::sha256_hex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Required prefix of the proof hash (fixed difficulty)
pub const DIFFICULTY_PREFIX: &str = "0000";

/// How many attempts run between checks of the stop signal
pub const CHECK_INTERVAL: u64 = 1024;

/// Does SHA256("<last_proof><proof>") start with the difficulty prefix?
/// Depends on nothing but its two arguments.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    proof_hash(last_proof, proof).starts_with(DIFFICULTY_PREFIX)
}

/// Hash checked by [`valid_proof`]
pub fn proof_hash(last_proof: u64, proof: u64) -> String {
    sha256_hex(format!("{last_proof}{proof}").as_bytes())
}

/// Stop signal for a mining run: a shared cancel flag plus an optional deadline
#[derive(Debug, Clone, Default)]
pub struct MiningControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl MiningControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop once `limit` has elapsed from now
    pub fn with_deadline(limit: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + limit),
        }
    }

    /// Request the run to stop; visible to every clone
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the miner should give up now
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Proof of Work miner
#[derive(Debug, Clone)]
pub struct Miner {
    check_interval: u64,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    pub fn new() -> Self {
        Self {
            check_interval: CHECK_INTERVAL,
        }
    }

    /// Check the stop signal every `interval` attempts
    pub fn with_check_interval(interval: u64) -> Self {
        Self {
            check_interval: interval.max(1),
        }
    }

    /// Find the lowest proof >= 0 satisfying [`valid_proof`]
    /// Returns `None` if the control signalled a stop first.
    pub fn mine(&self, last_proof: u64, control: &MiningControl) -> Option<MiningResult> {
        let start_time = Instant::now();
        let mut proof = 0u64;

        loop {
            if proof % self.check_interval == 0 && control.should_stop() {
                log::debug!(
                    "Mining on top of proof {} stopped after {} attempts",
                    last_proof,
                    proof
                );
                return None;
            }

            let hash = proof_hash(last_proof, proof);
            if hash.starts_with(DIFFICULTY_PREFIX) {
                return Some(MiningResult {
                    proof,
                    hash,
                    attempts: proof + 1,
                    duration: start_time.elapsed(),
                });
            }

            // Progress indicator every 100k attempts
            if proof > 0 && proof % 100_000 == 0 {
                let elapsed = start_time.elapsed();
                log::debug!(
                    "Mining attempts: {} ({:.1} KH/s)",
                    proof,
                    proof as f64 / elapsed.as_secs_f64() / 1000.0
                );
            }

            proof += 1;
        }
    }
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The proof that was found
    pub proof: u64,
    /// The hash that met the difficulty prefix
    pub hash: String,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64()
    }
}
