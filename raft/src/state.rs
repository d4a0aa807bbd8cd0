//! Per-node volatile Raft state.

use std::collections::{HashMap, HashSet};

use crate::log::Log;
use crate::message::{Index, NodeId, Term, NONE_INDEX};

/// The three roles a node can occupy. A node starts as [`Role::Follower`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Follower,
    Candidate,
    Leader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Follower => "FOLLOWER",
            Role::Candidate => "CANDIDATE",
            Role::Leader => "LEADER",
        }
    }
}

/// Volatile state carried by a single Raft node. Owned exclusively by the event loop.
pub struct ServerState {
    pub role: Role,
    pub current_term: Term,
    pub voted_for: Option<NodeId>,
    pub log: Log,
    pub commit_index: Index,
    pub last_applied: Index,

    /// Leader-only: next log index to send to each peer. Populated on becoming leader.
    pub next_index: HashMap<NodeId, Index>,
    /// Leader-only: highest log index known replicated to each peer.
    pub match_index: HashMap<NodeId, Index>,

    /// Candidate-only (meaningfully): peers that granted us a vote this term.
    pub votes_granted: HashSet<NodeId>,

    /// Cleared at the start of each election tick; set by a valid incoming `AppendEntries`.
    pub heard_from_leader: bool,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            role: Role::Follower,
            current_term: 0,
            voted_for: None,
            log: Log::new(),
            commit_index: NONE_INDEX,
            last_applied: NONE_INDEX,
            next_index: HashMap::new(),
            match_index: HashMap::new(),
            votes_granted: HashSet::new(),
            heard_from_leader: false,
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
