#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use raft::control::{Apply, Control};
use raft::core::handle_event;
use raft::message::{Event, LogEntry, Message, NodeId};
use raft::state::{Role, ServerState};

/// Collects every batch applied to a node's state machine, for assertions in tests.
#[derive(Clone, Default)]
pub struct Collector(Arc<Mutex<Vec<LogEntry>>>);

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<LogEntry> {
        self.0.lock().unwrap().clone()
    }
}

impl Apply for Collector {
    fn apply(&mut self, entries: &[LogEntry]) {
        self.0.lock().unwrap().extend_from_slice(entries);
    }
}

/// One simulated node: its Raft state, its control surface, and a handle onto what it has
/// applied so far.
pub struct SimNode {
    pub state: ServerState,
    pub control: Control,
    pub collector: Collector,
}

/// A deterministic in-memory cluster: no sockets, no threads, no timers. `tick()` advances
/// every node by one event from the shared message queue (or nothing, if the queue is
/// empty), so tests can interleave timer events and message delivery explicitly and
/// reproducibly.
pub struct Cluster {
    pub nodes: HashMap<NodeId, SimNode>,
    pub queue: VecDeque<Message>,
    /// (from, to) pairs currently dropped — used to simulate a network partition.
    pub partitioned: BTreeSet<(NodeId, NodeId)>,
}

impl Cluster {
    pub fn new(size: u64) -> Self {
        let ids: Vec<NodeId> = (0..size).collect();
        let mut nodes = HashMap::new();
        for &id in &ids {
            let peers: BTreeSet<NodeId> = ids.iter().copied().filter(|&p| p != id).collect();
            let collector = Collector::new();
            let control = Control::new(id, peers, Box::new(collector.clone()));
            nodes.insert(
                id,
                SimNode {
                    state: ServerState::new(),
                    control,
                    collector,
                },
            );
        }
        Self {
            nodes,
            queue: VecDeque::new(),
            partitioned: BTreeSet::new(),
        }
    }

    pub fn partition(&mut self, a: NodeId, b: NodeId) {
        self.partitioned.insert((a, b));
        self.partitioned.insert((b, a));
    }

    pub fn heal(&mut self, a: NodeId, b: NodeId) {
        self.partitioned.remove(&(a, b));
        self.partitioned.remove(&(b, a));
    }

    /// Deliver `event` to `node`, draining whatever it emits into the shared queue (subject
    /// to the current partition set).
    pub fn dispatch(&mut self, node: NodeId, event: Event) {
        let sim = self.nodes.get_mut(&node).expect("unknown node");
        let _ = handle_event(&mut sim.state, &mut sim.control, event);
        for msg in sim.control.take_outgoing() {
            if self.partitioned.contains(&(msg.source, msg.dest)) {
                continue;
            }
            self.queue.push_back(msg);
        }
    }

    /// Tick every node's election timer once.
    pub fn election_tick_all(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            self.dispatch(id, Event::ElectionTimeout);
        }
    }

    /// Tick every node's heartbeat timer once.
    pub fn heartbeat_tick_all(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            self.dispatch(id, Event::Heartbeat);
        }
    }

    /// Drain the shared message queue, delivering each message and re-queuing whatever new
    /// messages that delivery produces, until the queue is empty.
    pub fn settle(&mut self) {
        let mut guard = 0;
        while let Some(msg) = self.queue.pop_front() {
            guard += 1;
            assert!(guard < 100_000, "settle() did not converge");
            if self.partitioned.contains(&(msg.source, msg.dest)) {
                continue;
            }
            self.dispatch(msg.dest, Event::Network(msg));
        }
    }

    pub fn leaders(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.state.role == Role::Leader)
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn client_append(&mut self, node: NodeId, item: &[u8]) {
        self.dispatch(
            node,
            Event::Internal(raft::message::Internal::ClientAppendEntry(item.to_vec())),
        );
    }
}
