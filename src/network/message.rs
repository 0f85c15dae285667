// Network protocol messages
//
// Frame: 12-byte zero-padded type name, 4-byte little-endian payload length,
// then a JSON payload.

use crate::core::signature::{signature_from_hex, signature_to_hex};
use crate::core::{Block, Identity, Transaction, TxInput};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Size of the fixed frame header
pub const HEADER_LEN: usize = 16;

/// Largest payload accepted from a peer
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// Network message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    GetChain,
    Chain,
    Submit,
    Accepted,
    Rejected,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::GetChain => "getchain",
            MessageType::Chain => "chain",
            MessageType::Submit => "submit",
            MessageType::Accepted => "accepted",
            MessageType::Rejected => "rejected",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "getchain" => Some(MessageType::GetChain),
            "chain" => Some(MessageType::Chain),
            "submit" => Some(MessageType::Submit),
            "accepted" => Some(MessageType::Accepted),
            "rejected" => Some(MessageType::Rejected),
            _ => None,
        }
    }
}

/// A peer's full chain as it reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl RemoteChain {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// A signed transfer as a client hands it to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: f64,
    /// Hex DER signature over the signing payload
    pub signature: String,
    /// Ids of the outputs being spent
    pub inputs: Vec<String>,
}

impl TransferRequest {
    /// Wire form of a signed transaction
    pub fn from_transaction(tx: &Transaction) -> Result<Self> {
        let signature = tx.signature.as_ref().ok_or_else(|| {
            LedgerError::TransactionRejected("transaction is not signed".to_string())
        })?;

        Ok(Self {
            sender: tx.sender.clone(),
            recipient: tx.recipient.clone(),
            amount: tx.amount,
            signature: signature_to_hex(signature),
            inputs: tx.inputs.iter().map(|input| input.output_id.clone()).collect(),
        })
    }

    /// Rebuild the transaction; the signature is parsed but not verified here
    pub fn into_transaction(self) -> Result<Transaction> {
        let signature = signature_from_hex(&self.signature)?;
        let inputs = self.inputs.into_iter().map(TxInput::new).collect();

        Ok(Transaction::new(self.sender, self.recipient, self.amount)
            .with_inputs(inputs)
            .with_signature(signature))
    }
}

/// Network message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Ask a peer for its whole chain
    GetChain,
    /// Reply carrying the chain and its length
    Chain(RemoteChain),
    /// Hand a signed transaction to a node
    Submit(TransferRequest),
    /// The transaction was applied; carries the index of the block that will hold it
    Accepted(u64),
    /// The transaction was refused, with the reason
    Rejected(String),
}

impl Message {
    /// Get message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::GetChain => MessageType::GetChain,
            Message::Chain(_) => MessageType::Chain,
            Message::Submit(_) => MessageType::Submit,
            Message::Accepted(_) => MessageType::Accepted,
            Message::Rejected(_) => MessageType::Rejected,
        }
    }

    /// Serialize message to a frame
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = match self {
            Message::GetChain => Vec::new(),
            Message::Chain(remote) => serde_json::to_vec(remote)?,
            Message::Submit(request) => serde_json::to_vec(request)?,
            Message::Accepted(index) => serde_json::to_vec(index)?,
            Message::Rejected(reason) => serde_json::to_vec(reason)?,
        };

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());

        // Message type (12 bytes, padded with zeros)
        let mut type_bytes = [0u8; 12];
        let name = self.message_type().as_str().as_bytes();
        type_bytes[..name.len()].copy_from_slice(name);
        bytes.extend_from_slice(&type_bytes);

        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);

        Ok(bytes)
    }

    /// Parse the frame header into a type and payload length
    pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<(MessageType, usize)> {
        let name = std::str::from_utf8(&header[0..12])
            .map_err(|e| LedgerError::Serialization(format!("Invalid message type: {e}")))?
            .trim_end_matches('\0');

        let msg_type = MessageType::from_name(name).ok_or_else(|| {
            LedgerError::Serialization(format!("Unknown message type: {name}"))
        })?;

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&header[12..16]);
        let payload_len = u32::from_le_bytes(len_bytes) as usize;

        if payload_len > MAX_PAYLOAD_LEN {
            return Err(LedgerError::Serialization(format!(
                "Payload too large: {payload_len} bytes"
            )));
        }

        Ok((msg_type, payload_len))
    }

    /// Build a message from its type and payload
    pub fn from_payload(msg_type: MessageType, payload: &[u8]) -> Result<Self> {
        match msg_type {
            MessageType::GetChain => Ok(Message::GetChain),
            MessageType::Chain => Ok(Message::Chain(serde_json::from_slice(payload)?)),
            MessageType::Submit => Ok(Message::Submit(serde_json::from_slice(payload)?)),
            MessageType::Accepted => Ok(Message::Accepted(serde_json::from_slice(payload)?)),
            MessageType::Rejected => Ok(Message::Rejected(serde_json::from_slice(payload)?)),
        }
    }

    /// Deserialize a complete frame
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(LedgerError::Serialization("Message too short".to_string()));
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&data[..HEADER_LEN]);
        let (msg_type, payload_len) = Self::parse_header(&header)?;

        if data.len() < HEADER_LEN + payload_len {
            return Err(LedgerError::Serialization("Incomplete payload".to_string()));
        }

        Self::from_payload(msg_type, &data[HEADER_LEN..HEADER_LEN + payload_len])
    }
}
