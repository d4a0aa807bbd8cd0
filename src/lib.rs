//! Runtime harness for the `raft` consensus core: cluster configuration, size-prefixed
//! wire framing, the TCP listener/sender tasks, and the threaded event loop that drives
//! a node. The protocol logic itself lives in the `raft` crate; nothing here mutates
//! `ServerState` or `Control` outside of the event-loop thread spawned by [`runtime::start`].

pub mod apply;
pub mod config;
pub mod error;
pub mod repl;
pub mod runtime;
pub mod transport;
pub mod wire;
