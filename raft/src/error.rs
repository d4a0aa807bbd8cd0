//! Errors surfaced at the boundary of the Raft core.

use thiserror::Error;

use crate::message::NodeId;

/// Errors returned by [`crate::core::Raft`] entry points. Never produced by panics —
/// a panic inside a handler is always an implementation bug, not a protocol error.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RaftError {
    /// A client append was requested on a node that is not currently the leader. The core
    /// makes no attempt to forward the request to the leader (see the spec's design notes);
    /// the caller is expected to discover the leader out of band and retry there.
    #[error("node {0} rejected client append: not the leader")]
    NotLeader(NodeId),
}
