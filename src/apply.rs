//! The default `Apply` shipped with the runtime harness (§4.8): prints the node address
//! and the applied batch to stdout for a human watching the REPL, and mirrors the same
//! information to the structured log at `debug` level for test harnesses capturing it.

use raft::control::Apply;
use raft::message::{LogEntry, NodeId};

pub struct PrintApply {
    address: NodeId,
}

impl PrintApply {
    pub fn new(address: NodeId) -> Self {
        Self { address }
    }
}

impl Apply for PrintApply {
    fn apply(&mut self, entries: &[LogEntry]) {
        let items: Vec<&[u8]> = entries.iter().map(|e| e.item.as_slice()).collect();
        println!("{} applied {:?}", self.address, items);
        log::debug!("{} applied {} entries: {:?}", self.address, entries.len(), items);
    }
}
