// Peer connection management

use crate::core::Transaction;
use crate::error::{LedgerError, Result};
use crate::network::message::{HEADER_LEN, Message, RemoteChain, TransferRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Peer connection
pub struct Peer {
    addr: String,
    stream: TcpStream,
}

impl Peer {
    /// Wrap an accepted TCP stream
    pub fn new(stream: TcpStream, addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream,
        }
    }

    /// Connect to a peer at `host:port`
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| LedgerError::PeerUnreachable(format!("{addr}: {e}")))?;

        Ok(Self::new(stream, addr))
    }

    /// Send a message to the peer
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        let data = message.serialize()?;
        self.stream.write_all(&data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Receive a message from the peer
    pub async fn receive_message(&mut self) -> Result<Message> {
        let mut header = [0u8; HEADER_LEN];
        self.stream.read_exact(&mut header).await?;

        let (msg_type, payload_len) = Message::parse_header(&header)?;

        let mut payload = vec![0u8; payload_len];
        if payload_len > 0 {
            self.stream.read_exact(&mut payload).await?;
        }

        Message::from_payload(msg_type, &payload)
    }

    /// Ask the peer for its chain
    pub async fn request_chain(&mut self) -> Result<RemoteChain> {
        self.send_message(&Message::GetChain).await?;

        match self.receive_message().await? {
            Message::Chain(remote) => Ok(remote),
            other => Err(LedgerError::Serialization(format!(
                "Expected chain reply from {}, got {:?}",
                self.addr,
                other.message_type()
            ))),
        }
    }

    /// Hand a signed transaction to the peer
    /// Returns the index of the block that will hold it.
    pub async fn submit_transaction(&mut self, tx: &Transaction) -> Result<u64> {
        let request = TransferRequest::from_transaction(tx)?;
        self.send_message(&Message::Submit(request)).await?;

        match self.receive_message().await? {
            Message::Accepted(index) => Ok(index),
            Message::Rejected(reason) => Err(LedgerError::TransactionRejected(reason)),
            other => Err(LedgerError::Serialization(format!(
                "Expected submit reply from {}, got {:?}",
                self.addr,
                other.message_type()
            ))),
        }
    }

    /// Get peer address
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_request_chain_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (stream, remote) = listener.accept().await.unwrap();
            let mut peer = Peer::new(stream, remote.to_string());
            assert_eq!(peer.receive_message().await.unwrap(), Message::GetChain);
            peer.send_message(&Message::Chain(RemoteChain::new(vec![])))
                .await
                .unwrap();
        });

        let mut peer = Peer::connect(&addr).await.unwrap();
        let remote = peer.request_chain().await.unwrap();
        assert_eq!(remote.length, 0);
        assert_eq!(peer.addr(), addr);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to find a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(matches!(
            Peer::connect(&addr).await,
            Err(LedgerError::PeerUnreachable(_))
        ));
    }
}
