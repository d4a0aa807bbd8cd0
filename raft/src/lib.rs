//! A pure, event-driven Raft consensus core.
//!
//! This crate implements the hard part of Raft — leader election and log replication —
//! as a set of handlers in [`core`] that take `(state, control, event)` and mutate nothing
//! but that state and a buffer of outgoing messages. It deliberately knows nothing about
//! threads, timers, or sockets: those live in the runtime harness that embeds this crate
//! (see the `raftd` binary crate at the workspace root), which is what lets the protocol
//! logic here be driven just as easily by a deterministic in-memory transport in tests.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use raft::control::{Control, NullApply};
//! use raft::core::handle_event;
//! use raft::message::{Event, Message, Rpc};
//! use raft::state::{Role, ServerState};
//!
//! let mut state = ServerState::new();
//! let mut control = Control::new(0, BTreeSet::from([1, 2]), Box::new(NullApply));
//!
//! // An election timeout with no traffic promotes a follower to candidate...
//! handle_event(&mut state, &mut control, Event::ElectionTimeout).unwrap();
//! assert_eq!(state.role, Role::Candidate);
//! control.take_outgoing(); // the broadcast RequestVote to peers 1 and 2
//!
//! // ...and a single granted vote (majority of 2 peers is 1) makes it leader.
//! let vote = Message {
//!     source: 1,
//!     dest: 0,
//!     term: state.current_term,
//!     rpc: Rpc::RequestVoteResponse { vote_granted: true },
//! };
//! handle_event(&mut state, &mut control, Event::Network(vote)).unwrap();
//! assert_eq!(state.role, Role::Leader);
//! ```

pub mod control;
pub mod core;
pub mod error;
pub mod log;
pub mod message;
pub mod state;
