//! The static cluster address table and the three timer tunables, per §4.9/§6 of the
//! runtime harness: compiled-in defaults, overridable (for the tunables only) by
//! environment variables that test tooling sets when it needs faster timers.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use raft::message::NodeId;

use crate::error::ConfigError;

const DEFAULT_CLUSTER_SIZE: u64 = 5;
const DEFAULT_BASE_PORT: u16 = 15000;

/// A static mapping of peer id to its `(host, port)`. Not overridable from the
/// environment: dynamic cluster sizing is out of scope (see spec.md §1).
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    addresses: BTreeMap<NodeId, SocketAddr>,
}

impl ClusterConfig {
    /// The default five-entry table on `127.0.0.1:15000..15004`.
    pub fn default_five_node() -> Self {
        let addresses = (0..DEFAULT_CLUSTER_SIZE)
            .map(|id| {
                let addr = format!("127.0.0.1:{}", DEFAULT_BASE_PORT + id as u16)
                    .parse()
                    .expect("a 127.0.0.1 address with a valid port always parses");
                (id, addr)
            })
            .collect();
        Self { addresses }
    }

    /// Builds a table from an explicit list, for tests that want a smaller cluster.
    pub fn from_addresses(addresses: impl IntoIterator<Item = (NodeId, SocketAddr)>) -> Self {
        Self {
            addresses: addresses.into_iter().collect(),
        }
    }

    pub fn address_of(&self, node: NodeId) -> Result<SocketAddr, ConfigError> {
        self.addresses
            .get(&node)
            .copied()
            .ok_or_else(|| ConfigError::UnknownNode(node, self.addresses.len()))
    }

    pub fn peers_of(&self, node: NodeId) -> std::collections::BTreeSet<NodeId> {
        self.addresses.keys().copied().filter(|&id| id != node).collect()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.addresses.keys().copied()
    }
}

/// The three timer tunables. The election bound must exceed several heartbeat periods
/// for stability (§6); the compiled-in defaults leave ample headroom (1s vs. 5-8s).
#[derive(Clone, Copy, Debug)]
pub struct Tunables {
    pub heartbeat: Duration,
    pub election_base: Duration,
    pub election_jitter: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_secs(1),
            election_base: Duration::from_secs(5),
            election_jitter: Duration::from_secs(3),
        }
    }
}

impl Tunables {
    /// Starts from the compiled-in defaults and applies `RAFT_HEARTBEAT_MS`,
    /// `RAFT_ELECTION_BASE_MS`, and `RAFT_ELECTION_JITTER_MS` overrides where present.
    /// A present-but-unparseable override is logged at `warn` and the default is kept;
    /// overrides never abort startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            heartbeat: env_override_ms("RAFT_HEARTBEAT_MS", defaults.heartbeat),
            election_base: env_override_ms("RAFT_ELECTION_BASE_MS", defaults.election_base),
            election_jitter: env_override_ms("RAFT_ELECTION_JITTER_MS", defaults.election_jitter),
        }
    }
}

fn env_override_ms(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Err(_) => default,
        Ok(raw) => match raw.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                log::warn!(
                    "{} is set to {:?}, which is not a valid integer in milliseconds; keeping default {:?}",
                    var,
                    raw,
                    default
                );
                default
            }
        },
    }
}
