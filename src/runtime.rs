//! The per-node runtime harness (§5): the event-loop thread that exclusively owns
//! `ServerState`/`Control`, the timer tasks that feed it, the listener and per-peer
//! senders that bridge it to the network, and the `Controller` handle used to inject
//! commands from outside (the REPL, or any other embedder).

use std::collections::{BTreeMap, BTreeSet};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use raft::control::{Apply, Control};
use raft::core::handle_event;
use raft::message::{Event, Internal, Message, NodeId};
use raft::state::ServerState;

use crate::config::{ClusterConfig, Tunables};
use crate::error::ConfigError;
use crate::transport;

const EVENT_LOOP_RECV_TIMEOUT: Duration = Duration::from_secs(10);
const SENDER_CHANNEL_CAPACITY: usize = 256;

/// A handle onto a running node. The REPL (or any embedder) uses this to inject the two
/// internal commands the protocol core accepts from outside the network (§6); neither
/// crosses the network, and neither requires the caller to touch `ServerState` directly.
#[derive(Clone)]
pub struct Controller {
    address: NodeId,
    inbound: Sender<Event>,
}

impl Controller {
    pub fn address(&self) -> NodeId {
        self.address
    }

    /// Enqueues a `ClientAppendEntry`. Rejected (as a `RaftError::NotLeader`, logged by
    /// the event loop) rather than applied if this node is not currently the leader.
    pub fn append(&self, item: Vec<u8>) {
        let _ = self.inbound.send(Event::Internal(Internal::ClientAppendEntry(item)));
    }

    /// Enqueues a `RaftDebug`, printing this node's current Raft state.
    pub fn debug(&self) {
        let _ = self.inbound.send(Event::Internal(Internal::RaftDebug));
    }
}

/// Starts node `address`: binds its listener, opens a sender task per peer, starts the
/// heartbeat and election tickers, and spawns the event-loop thread. Returns immediately
/// with a [`Controller`]; the node then runs until the process exits (§5: no graceful
/// shutdown is specified).
pub fn start(
    address: NodeId,
    config: ClusterConfig,
    tunables: Tunables,
    apply_sink: Box<dyn Apply>,
) -> Result<Controller, ConfigError> {
    let own_addr = config.address_of(address)?;
    let peers = config.peers_of(address);

    let (inbound_tx, inbound_rx) = unbounded::<Event>();

    transport::spawn_listener(own_addr, inbound_tx.clone());

    let mut peer_senders = BTreeMap::new();
    for &peer in &peers {
        let peer_addr = config.address_of(peer)?;
        let (tx, rx) = bounded::<Message>(SENDER_CHANNEL_CAPACITY);
        transport::spawn_sender(peer_addr, rx);
        peer_senders.insert(peer, tx);
    }

    spawn_heartbeat_ticker(inbound_tx.clone(), tunables.heartbeat);
    spawn_election_ticker(inbound_tx.clone(), tunables.election_base, tunables.election_jitter);
    spawn_event_loop(address, peers, apply_sink, peer_senders, inbound_rx);

    Ok(Controller {
        address,
        inbound: inbound_tx,
    })
}

fn spawn_heartbeat_ticker(inbound: Sender<Event>, period: Duration) {
    thread::spawn(move || loop {
        thread::sleep(period);
        if inbound.send(Event::Heartbeat).is_err() {
            return;
        }
    });
}

fn spawn_election_ticker(inbound: Sender<Event>, base: Duration, jitter: Duration) {
    thread::spawn(move || {
        let mut rng = SmallRng::from_entropy();
        loop {
            let jitter_ms = if jitter.is_zero() {
                0
            } else {
                rng.gen_range(0..=jitter.as_millis() as u64)
            };
            thread::sleep(base + Duration::from_millis(jitter_ms));
            if inbound.send(Event::ElectionTimeout).is_err() {
                return;
            }
        }
    });
}

fn spawn_event_loop(
    address: NodeId,
    peers: BTreeSet<NodeId>,
    apply_sink: Box<dyn Apply>,
    peer_senders: BTreeMap<NodeId, Sender<Message>>,
    inbound: Receiver<Event>,
) {
    thread::spawn(move || {
        let mut state = ServerState::new();
        let mut control = Control::new(address, peers, apply_sink);

        loop {
            match inbound.recv_timeout(EVENT_LOOP_RECV_TIMEOUT) {
                Ok(event) => {
                    if let Err(err) = handle_event(&mut state, &mut control, event) {
                        log::debug!("{} rejected event: {}", address, err);
                    }
                    for message in control.take_outgoing() {
                        route(&peer_senders, message);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    });
}

fn route(peer_senders: &BTreeMap<NodeId, Sender<Message>>, message: Message) {
    if let Some(sender) = peer_senders.get(&message.dest) {
        // A full channel means the peer is backed up or unreachable; drop rather than
        // block the event loop (§5: a down peer must not stall other sender tasks).
        let _ = sender.try_send(message);
    }
}
