//! Wire and internal message types exchanged between Raft nodes.
//!
//! [`Message`] is the top-level envelope carried between peers; its [`Rpc`] payload is a
//! tagged variant per RPC kind. [`Internal`] carries the two commands injected locally
//! (by a REPL or other external collaborator) rather than received over the network.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The id of a peer in the (static) cluster. Peers are numbered `0..N`.
pub type NodeId = u64;

/// A Raft leadership term. Monotonically non-decreasing, starts at `0`.
pub type Term = i64;

/// A 0-based position in the log, or `-1` meaning "no such entry".
pub type Index = i64;

/// The index value meaning "nothing here yet" — an empty log, no commits, no prior entry.
pub const NONE_INDEX: Index = -1;

/// An immutable entry in the replicated log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The term of the leader that appended this entry.
    pub term: Term,
    /// Arbitrary, opaque payload. The core never interprets this.
    pub item: Vec<u8>,
}

/// A message addressed between two specific nodes, carrying the sender's current term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub source: NodeId,
    pub dest: NodeId,
    pub term: Term,
    pub rpc: Rpc,
}

/// The network RPC kinds a [`Message`] may carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Rpc {
    AppendEntries {
        prev_index: Index,
        prev_term: Term,
        entries: Vec<LogEntry>,
        commit_index: Index,
    },
    AppendEntriesResponse {
        success: bool,
        match_index: Index,
    },
    RequestVote {
        last_log_index: Index,
        last_log_term: Term,
    },
    RequestVoteResponse {
        vote_granted: bool,
    },
}

/// Commands injected locally by an external collaborator (the REPL). These never cross
/// the network and carry no term — they bypass the term-check entirely (see the core
/// dispatch rules).
#[derive(Clone, Debug)]
pub enum Internal {
    /// Append `item` to the log, if this node is currently the leader.
    ClientAppendEntry(Vec<u8>),
    /// Print this node's current Raft state for debugging.
    RaftDebug,
}

/// Everything the event loop may hand to the core: network messages, local commands, and
/// the two periodic timers.
#[derive(Clone, Debug)]
pub enum Event {
    Network(Message),
    Internal(Internal),
    Heartbeat,
    ElectionTimeout,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} term={} {}",
            self.source, self.dest, self.term, self.rpc
        )
    }
}

impl fmt::Display for Rpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rpc::AppendEntries {
                prev_index,
                prev_term,
                entries,
                commit_index,
            } => write!(
                f,
                "AppendEntries(prev_index={}, prev_term={}, entries={}, commit_index={})",
                prev_index,
                prev_term,
                entries.len(),
                commit_index
            ),
            Rpc::AppendEntriesResponse {
                success,
                match_index,
            } => write!(
                f,
                "AppendEntriesResponse(success={}, match_index={})",
                success, match_index
            ),
            Rpc::RequestVote {
                last_log_index,
                last_log_term,
            } => write!(
                f,
                "RequestVote(last_log_index={}, last_log_term={})",
                last_log_index, last_log_term
            ),
            Rpc::RequestVoteResponse { vote_granted } => {
                write!(f, "RequestVoteResponse(vote_granted={})", vote_granted)
            }
        }
    }
}
