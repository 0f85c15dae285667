// Transaction data structures and application against the UTXO ledger

use crate::core::{Identity, format_amount, hash_concat, signature};
use crate::error::{LedgerError, Result};
use crate::storage::UtxoLedger;
use secp256k1::SecretKey;
use secp256k1::ecdsa::Signature;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Transaction output - a discrete spendable value record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Owner of the value
    pub recipient: Identity,
    /// Value carried (may be negative for under-funded change)
    pub amount: f64,
    /// Id of the transaction that created this output
    pub parent_tx_id: String,
    /// Deterministic id, see [`output_id`]
    pub id: String,
}

impl TxOutput {
    /// Create a new output; its id is derived from the other fields
    pub fn new(recipient: Identity, amount: f64, parent_tx_id: &str) -> Self {
        let id = output_id(&recipient, amount, parent_tx_id);
        Self {
            recipient,
            amount,
            parent_tx_id: parent_tx_id.to_string(),
            id,
        }
    }

    /// Check whether this output belongs to the identity
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        &self.recipient == identity
    }
}

/// Output id = SHA256(recipient ‖ amount ‖ parent transaction id)
///
/// Two outputs with identical recipient, amount and parent share an id and
/// are treated as the same output by the ledger.
pub fn output_id(recipient: &Identity, amount: f64, parent_tx_id: &str) -> String {
    hash_concat(&[recipient.as_str(), &format_amount(amount), parent_tx_id])
}

/// Transaction input - references an output by id
#[derive(Debug, Clone, PartialEq)]
pub struct TxInput {
    /// Id of the output being spent
    pub output_id: String,
    /// The output found in the ledger during application, if any
    pub resolved: Option<TxOutput>,
}

impl TxInput {
    pub fn new(output_id: impl Into<String>) -> Self {
        Self {
            output_id: output_id.into(),
            resolved: None,
        }
    }

    /// Value contributed by this input (zero when unresolved)
    pub fn value(&self) -> f64 {
        self.resolved.as_ref().map_or(0.0, |out| out.amount)
    }
}

/// Source of the sequence numbers mixed into transaction ids
///
/// One counter serves every transaction a node applies. Identical
/// transaction content therefore receives a different id each time it is
/// applied, while two counters started at the same value hand out the same
/// ids for the same content.
#[derive(Debug, Default)]
pub struct TxSequence {
    next: AtomicU64,
}

impl TxSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start handing out numbers from `start`
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Take the next number
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// The number the next call to [`TxSequence::next`] returns
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Move the counter up to at least `floor`; never moves it back
    pub fn advance_to(&self, floor: u64) {
        self.next.fetch_max(floor, Ordering::SeqCst);
    }
}

/// Lifecycle of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Constructed,
    Signed,
    Applied,
    Rejected,
}

/// Committed form of a transaction, as stored inside blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    pub id: String,
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: f64,
}

/// Transaction
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Sender identity (public key)
    pub sender: Identity,
    /// Recipient identity (public key)
    pub recipient: Identity,
    /// Value transferred to the recipient
    pub amount: f64,
    /// Signature over sender, recipient and amount
    pub signature: Option<Signature>,
    /// Outputs being spent
    pub inputs: Vec<TxInput>,
    /// Outputs created on application
    pub outputs: Vec<TxOutput>,
    /// Id assigned on application
    pub tx_id: Option<String>,
    state: TxState,
}

impl Transaction {
    /// Create a new unsigned transaction without inputs
    pub fn new(sender: Identity, recipient: Identity, amount: f64) -> Self {
        Self {
            sender,
            recipient,
            amount,
            signature: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            tx_id: None,
            state: TxState::Constructed,
        }
    }

    /// Attach inputs
    pub fn with_inputs(mut self, inputs: Vec<TxInput>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Attach a signature produced elsewhere, e.g. one received from a client
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        if self.state == TxState::Constructed {
            self.state = TxState::Signed;
        }
        self
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// A transaction without inputs mints value and skips signature checks
    pub fn is_genesis(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The exact text covered by the signature
    /// Inputs, outputs and the id are not covered; they are only known
    /// after signing.
    pub fn signing_payload(&self) -> String {
        format!(
            "{}{}{}",
            self.sender,
            self.recipient,
            format_amount(self.amount)
        )
    }

    /// Id for this content at the given sequence number
    pub fn calculate_hash(&self, sequence: u64) -> String {
        hash_concat(&[
            self.sender.as_str(),
            self.recipient.as_str(),
            &format_amount(self.amount),
            &sequence.to_string(),
        ])
    }

    /// Sign with the sender's secret key
    pub fn sign(&mut self, secret_key: &SecretKey) -> Result<()> {
        let sig = signature::sign(self.signing_payload().as_bytes(), secret_key)?;
        self.signature = Some(sig);
        if self.state == TxState::Constructed {
            self.state = TxState::Signed;
        }
        Ok(())
    }

    /// Verify the signature against the sender identity
    pub fn verify_signature(&self) -> bool {
        let Some(sig) = &self.signature else {
            return false;
        };
        let Ok(public_key) = self.sender.to_public_key() else {
            return false;
        };
        signature::verify(sig, self.signing_payload().as_bytes(), &public_key)
    }

    /// Total value of resolved inputs
    pub fn input_value(&self) -> f64 {
        self.inputs.iter().map(TxInput::value).sum()
    }

    /// Apply the transaction to the ledger
    ///
    /// On success the transaction is `Applied`: it has an id, two outputs
    /// (recipient, then change back to the sender) and the ledger holds
    /// those outputs instead of the spent ones. A failed signature check
    /// leaves the ledger untouched and the transaction `Rejected`.
    ///
    /// The change output is not guarded against going negative: inputs
    /// worth less than `amount` still apply and leave a negative change.
    pub fn process(&mut self, ledger: &mut UtxoLedger, sequence: &TxSequence) -> Result<()> {
        if matches!(self.state, TxState::Applied | TxState::Rejected) {
            return Err(LedgerError::TransactionRejected(
                "transaction was already processed".to_string(),
            ));
        }

        if !self.is_genesis() && !self.verify_signature() {
            self.state = TxState::Rejected;
            log::warn!(
                "Rejected transaction from {} to {}: signature verification failed",
                self.sender,
                self.recipient
            );
            return Err(LedgerError::TransactionRejected(
                "signature verification failed".to_string(),
            ));
        }

        for input in &mut self.inputs {
            input.resolved = ledger.get(&input.output_id).cloned();
        }

        let leftover = self.input_value() - self.amount;
        let tx_id = self.calculate_hash(sequence.next());

        self.outputs = settle(
            ledger,
            &self.sender,
            &self.recipient,
            self.amount,
            leftover,
            &self.inputs,
            &tx_id,
        );
        self.tx_id = Some(tx_id);
        self.state = TxState::Applied;

        Ok(())
    }

    /// Committed form; only available once applied
    pub fn record(&self) -> Option<TxRecord> {
        let id = self.tx_id.clone()?;
        Some(TxRecord {
            id,
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount,
        })
    }
}

/// Re-apply an already committed record with the given inputs
/// Used when rebuilding the ledger from a chain; no signature is checked
/// and the recorded id is reused.
pub fn replay_record(record: &TxRecord, inputs: &[TxInput], ledger: &mut UtxoLedger) -> Vec<TxOutput> {
    let resolved: Vec<TxInput> = inputs
        .iter()
        .map(|input| TxInput {
            output_id: input.output_id.clone(),
            resolved: ledger.get(&input.output_id).cloned(),
        })
        .collect();
    let leftover = resolved.iter().map(TxInput::value).sum::<f64>() - record.amount;

    settle(
        ledger,
        &record.sender,
        &record.recipient,
        record.amount,
        leftover,
        &resolved,
        &record.id,
    )
}

// Create the recipient and change outputs, then drop the resolved inputs
fn settle(
    ledger: &mut UtxoLedger,
    sender: &Identity,
    recipient: &Identity,
    amount: f64,
    leftover: f64,
    inputs: &[TxInput],
    tx_id: &str,
) -> Vec<TxOutput> {
    let outputs = vec![
        TxOutput::new(recipient.clone(), amount, tx_id),
        TxOutput::new(sender.clone(), leftover, tx_id),
    ];

    for output in &outputs {
        ledger.insert(output.clone());
    }

    for input in inputs {
        if input.resolved.is_some() {
            ledger.remove(&input.output_id);
        }
    }

    outputs
}
