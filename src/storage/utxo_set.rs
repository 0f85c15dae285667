// UTXO (Unspent Transaction Output) ledger

use crate::core::{Block, Identity, TxInput, TxOutput, replay_record};
use std::collections::BTreeMap;

/// The set of unspent outputs, keyed by output id
///
/// One instance is owned by each running node and shared by reference with
/// whatever applies transactions; it is never global state. Keys are kept
/// ordered so input selection is reproducible.
#[derive(Debug, Clone, Default)]
pub struct UtxoLedger {
    outputs: BTreeMap<String, TxOutput>,
}

impl UtxoLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unspent output (replaces an output with the same id)
    pub fn insert(&mut self, output: TxOutput) {
        self.outputs.insert(output.id.clone(), output);
    }

    /// Look up an unspent output
    pub fn get(&self, output_id: &str) -> Option<&TxOutput> {
        self.outputs.get(output_id)
    }

    /// Remove a spent output
    pub fn remove(&mut self, output_id: &str) -> Option<TxOutput> {
        self.outputs.remove(output_id)
    }

    pub fn contains(&self, output_id: &str) -> bool {
        self.outputs.contains_key(output_id)
    }

    /// Count total UTXOs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    /// All unspent outputs in id order
    pub fn iter(&self) -> impl Iterator<Item = &TxOutput> {
        self.outputs.values()
    }

    /// Get all UTXOs owned by an identity
    pub fn outputs_for(&self, owner: &Identity) -> Vec<&TxOutput> {
        self.outputs
            .values()
            .filter(|out| out.is_owned_by(owner))
            .collect()
    }

    /// Get balance for an identity
    pub fn balance_of(&self, owner: &Identity) -> f64 {
        self.outputs_for(owner).iter().map(|out| out.amount).sum()
    }

    /// Select the owner's outputs, in id order, until `target` is covered
    ///
    /// Outputs with non-positive value are skipped. When the owner cannot
    /// cover the target every positive output is returned; callers decide
    /// whether that is an error.
    pub fn select_inputs(&self, owner: &Identity, target: f64) -> (Vec<TxInput>, f64) {
        let mut selected = Vec::new();
        let mut total = 0.0;

        for output in self.outputs_for(owner) {
            if output.amount <= 0.0 {
                continue;
            }
            selected.push(TxInput::new(output.id.clone()));
            total += output.amount;

            if total >= target {
                break;
            }
        }

        (selected, total)
    }

    /// Rebuild the ledger from committed blocks
    ///
    /// Blocks only commit `id, sender, recipient, amount`, so the inputs each
    /// transaction originally spent are not recorded. Records in the genesis
    /// block and records sent by the mint identity are replayed without
    /// inputs; every other record spends the sender's outputs picked by
    /// [`UtxoLedger::select_inputs`], the same rule the wallet uses.
    pub fn rebuild_from_chain(&mut self, blocks: &[Block]) {
        self.clear();

        for block in blocks {
            for record in &block.transactions {
                let inputs = if block.is_genesis() || record.sender.is_mint() {
                    Vec::new()
                } else {
                    self.select_inputs(&record.sender, record.amount).0
                };
                replay_record(record, &inputs, self);
            }
        }

        log::debug!(
            "Rebuilt UTXO ledger from {} block(s): {} unspent output(s)",
            blocks.len(),
            self.len()
        );
    }
}
