//! Property-style checks of the invariants a correct Raft implementation must uphold,
//! run against the deterministic in-memory [`common::Cluster`] under repeated elections,
//! churn, and partitions.

mod common;

use std::collections::HashMap;

use common::Cluster;
use raft::state::Role;

/// Election safety: at most one leader can exist for any given term.
#[test]
fn at_most_one_leader_per_term_across_repeated_elections() {
    let mut cluster = Cluster::new(5);
    let mut leaders_by_term: HashMap<i64, Vec<u64>> = HashMap::new();

    for _ in 0..6 {
        cluster.election_tick_all();
        cluster.settle();
        for (&id, node) in &cluster.nodes {
            if node.state.role == Role::Leader {
                leaders_by_term.entry(node.state.current_term).or_default().push(id);
            }
        }
    }

    for (term, leaders) in &leaders_by_term {
        assert!(
            leaders.iter().collect::<std::collections::HashSet<_>>().len() <= 1,
            "term {} had more than one leader: {:?}",
            term,
            leaders
        );
    }
}

/// Leader append-only: a leader's log only ever grows, never shrinks or rewrites history
/// at indices it already holds.
#[test]
fn a_leaders_log_is_append_only_across_committed_rounds() {
    let mut cluster = Cluster::new(3);
    cluster.election_tick_all();
    cluster.settle();
    let leader = cluster.leaders()[0];

    let mut prefix = Vec::new();
    for i in 0..5u8 {
        cluster.client_append(leader, &[i]);
        cluster.heartbeat_tick_all();
        cluster.settle();

        let log_now: Vec<_> = (0..cluster.nodes[&leader].state.log.len() as i64)
            .map(|idx| cluster.nodes[&leader].state.log.entry_at(idx).cloned().unwrap())
            .collect();
        assert!(log_now.starts_with(&prefix), "leader log rewrote its own history");
        prefix = log_now;
    }
}

/// Log matching: whenever two nodes' logs contain an entry with the same index and term,
/// every entry up to and including that index is identical on both.
#[test]
fn logs_that_agree_at_an_index_and_term_agree_on_every_earlier_entry_too() {
    let mut cluster = Cluster::new(3);
    cluster.election_tick_all();
    cluster.settle();
    let leader = cluster.leaders()[0];

    for i in 0..4u8 {
        cluster.client_append(leader, &[i]);
        cluster.heartbeat_tick_all();
        cluster.settle();
    }

    let ids: Vec<u64> = cluster.nodes.keys().copied().collect();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let a = &cluster.nodes[&ids[i]].state.log;
            let b = &cluster.nodes[&ids[j]].state.log;
            let upto = a.last_index().min(b.last_index());
            for idx in 0..=upto {
                if idx < 0 {
                    continue;
                }
                if a.term_at(idx) == b.term_at(idx) {
                    for earlier in 0..idx {
                        assert_eq!(
                            a.entry_at(earlier),
                            b.entry_at(earlier),
                            "logs agree at {} but diverge at earlier index {}",
                            idx,
                            earlier
                        );
                    }
                }
            }
        }
    }
}

/// `commit_index` and `last_applied` never move backwards on any single node, even across
/// elections and partitions.
#[test]
fn commit_index_and_last_applied_are_monotonic_under_churn() {
    let mut cluster = Cluster::new(5);
    cluster.election_tick_all();
    cluster.settle();

    let mut last_commit: HashMap<u64, i64> = HashMap::new();
    let mut last_applied: HashMap<u64, i64> = HashMap::new();

    for round in 0..10u8 {
        if let Some(leader) = cluster.leaders().first().copied() {
            cluster.client_append(leader, &[round]);
        }
        cluster.heartbeat_tick_all();
        cluster.settle();
        if round % 3 == 0 {
            cluster.election_tick_all();
            cluster.settle();
        }

        for (&id, node) in &cluster.nodes {
            let prev_commit = *last_commit.get(&id).unwrap_or(&i64::MIN);
            let prev_applied = *last_applied.get(&id).unwrap_or(&i64::MIN);
            assert!(node.state.commit_index >= prev_commit);
            assert!(node.state.last_applied >= prev_applied);
            assert!(node.state.last_applied <= node.state.commit_index);
            last_commit.insert(id, node.state.commit_index);
            last_applied.insert(id, node.state.last_applied);
        }
    }
}

/// Leader completeness: an entry committed in some term is present in the log of every
/// leader elected afterwards.
#[test]
fn a_committed_entry_survives_into_every_subsequent_leaders_log() {
    let mut cluster = Cluster::new(3);
    let leader = {
        cluster.election_tick_all();
        cluster.settle();
        cluster.leaders()[0]
    };

    cluster.client_append(leader, b"durable");
    cluster.heartbeat_tick_all();
    cluster.settle();
    assert_eq!(cluster.nodes[&leader].state.commit_index, 0);
    let committed_entry = cluster.nodes[&leader].state.log.entry_at(0).cloned().unwrap();

    // Force a new election by isolating the current leader and letting the other two
    // run two election ticks (first consumes `heard_from_leader`, second elects).
    let others: Vec<u64> = cluster.nodes.keys().copied().filter(|&id| id != leader).collect();
    for &id in &others {
        cluster.partition(leader, id);
    }
    cluster.election_tick_all();
    cluster.settle();
    cluster.election_tick_all();
    cluster.settle();

    let new_leader = *others
        .iter()
        .find(|&&id| cluster.nodes[&id].state.role == Role::Leader)
        .expect("the reachable majority elects a new leader");
    assert_eq!(cluster.nodes[&new_leader].state.log.entry_at(0), Some(&committed_entry));
}
