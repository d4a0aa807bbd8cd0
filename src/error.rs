//! Errors surfaced at the runtime-harness boundary: wire framing/codec failures and
//! cluster configuration lookups. Raft protocol errors live in `raft::error::RaftError`.

use thiserror::Error;

use raft::message::NodeId;

/// Errors from the size-prefixed wire framer and its codec.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame length prefix is not a valid integer")]
    BadLengthPrefix,
    #[error("payload of {0} bytes does not fit the 10-digit length prefix")]
    FrameTooLarge(usize),
    #[error("failed to encode/decode message: {0}")]
    Codec(#[from] bincode::Error),
}

/// Errors from looking a node up in the static cluster table.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("node {0} is not present in the {1}-entry cluster table")]
    UnknownNode(NodeId, usize),
}
