//! The `Control` object: a node's address/peer set, its outbound message buffer, and the
//! hook through which committed entries reach the external state machine.
//!
//! This isolates every side effect the core performs — sending a message, applying a
//! committed batch — behind one small surface, so the core can be driven by an in-memory
//! transport in tests exactly as it is by the real TCP harness in production.

use std::collections::BTreeSet;

use crate::message::{LogEntry, Message, NodeId};

/// Receives batches of newly-committed log entries, in order, exactly once each.
pub trait Apply: Send {
    fn apply(&mut self, entries: &[LogEntry]);
}

/// A no-op [`Apply`], useful for tests that only care about replication, not application.
pub struct NullApply;

impl Apply for NullApply {
    fn apply(&mut self, _entries: &[LogEntry]) {}
}

/// Per-node control surface borrowed by every handler in [`crate::core`].
pub struct Control {
    pub address: NodeId,
    pub peers: BTreeSet<NodeId>,
    outgoing: Vec<Message>,
    apply_sink: Box<dyn Apply>,
}

impl Control {
    pub fn new(address: NodeId, peers: BTreeSet<NodeId>, apply_sink: Box<dyn Apply>) -> Self {
        Self {
            address,
            peers,
            outgoing: Vec::new(),
            apply_sink,
        }
    }

    /// Queue `message` for delivery. Drained by the event loop after the handler returns.
    pub fn send(&mut self, message: Message) {
        self.outgoing.push(message);
    }

    /// Queue `message` to every known peer.
    pub fn broadcast(&mut self, mut build: impl FnMut(NodeId) -> Message) {
        let peers: Vec<NodeId> = self.peers.iter().copied().collect();
        for peer in peers {
            self.outgoing.push(build(peer));
        }
    }

    pub fn apply(&mut self, entries: &[LogEntry]) {
        self.apply_sink.apply(entries);
    }

    /// Majority size required among `peers` (self excluded), per §4.6: `⌊N/2⌋` votes from
    /// peers, which together with the candidate's own implicit vote forms a strict majority
    /// of the full `N+1`-node cluster.
    pub fn vote_majority(&self) -> usize {
        self.peers.len() / 2
    }

    /// Drain and return everything queued by the handler that just ran.
    pub fn take_outgoing(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outgoing)
    }
}
