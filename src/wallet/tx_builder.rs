// Transaction builder

use crate::core::{Identity, Transaction};
use crate::error::{LedgerError, Result};
use crate::storage::UtxoLedger;
use crate::wallet::{KeyPair, Keystore};

/// Builds signed transactions from a keystore and a view of the ledger
///
/// The checks here are client-side only: the ledger itself still applies a
/// transaction whose inputs fall short of its amount.
pub struct TransactionBuilder<'a> {
    keystore: &'a Keystore,
    ledger: &'a UtxoLedger,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(keystore: &'a Keystore, ledger: &'a UtxoLedger) -> Self {
        Self { keystore, ledger }
    }

    /// Build a transaction paying `amount` from the named key to `to`
    pub fn build(&self, from: &str, to: &Identity, amount: f64) -> Result<Transaction> {
        let keypair = self.keypair(from)?;

        if !(amount.is_finite() && amount > 0.0) {
            return Err(LedgerError::TransactionRejected(format!(
                "Amount must be positive, got {amount}"
            )));
        }

        let (inputs, total_input) = self.ledger.select_inputs(&keypair.identity, amount);
        if total_input < amount {
            return Err(LedgerError::TransactionRejected(format!(
                "Insufficient funds: have {total_input}, need {amount}"
            )));
        }

        log::debug!(
            "Spending {} output(s) worth {} to send {}",
            inputs.len(),
            total_input,
            amount
        );

        let mut tx = Transaction::new(keypair.identity.clone(), to.clone(), amount)
            .with_inputs(inputs);
        tx.sign(&keypair.secret_key)?;

        Ok(tx)
    }

    /// Spendable balance of the named key
    pub fn balance(&self, name: &str) -> Result<f64> {
        let keypair = self.keypair(name)?;
        Ok(self.ledger.balance_of(&keypair.identity))
    }

    fn keypair(&self, name: &str) -> Result<&'a KeyPair> {
        self.keystore
            .get(name)
            .ok_or_else(|| LedgerError::Config(format!("Key {name} not found in keystore")))
    }
}
