// Networking: wire messages, peer transport, peer registry and the node service

mod message;
mod node;
mod peer;
mod registry;
pub(crate) mod transport;

pub use message::{Message, MessageType, RemoteChain, TransferRequest};
pub use node::Node;
pub use peer::Peer;
pub use registry::{PeerRegistry, join_host_port, parse_address, probe_address};
pub use transport::{PeerTransport, TcpTransport};
