// Core ledger data structures

mod types;
mod transaction;
mod block;
mod chain;
mod serialize;
mod hash;
mod merkle;
pub mod signature;

pub use types::*;
pub use transaction::*;
pub use block::*;
pub use chain::*;
pub use serialize::*;
pub use hash::*;
pub use merkle::{merkle_root, EMPTY_MERKLE_ROOT};
pub use signature::{generate_keypair, sign, verify};
