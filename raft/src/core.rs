//! The pure Raft handlers: one function per event kind, each taking `(&mut ServerState,
//! &mut Control, ..)` and returning nothing but mutated state and queued outbound messages.
//!
//! None of these functions block, sleep, or touch the network directly — every side effect
//! goes through [`Control::send`] or [`Control::apply`]. This is what lets the whole module
//! be driven from an in-memory transport in tests and from real sockets in the runtime
//! harness with no change to the logic itself.

use log::{debug, info, trace};

use crate::control::Control;
use crate::error::RaftError;
use crate::message::{Event, Index, Internal, LogEntry, Message, NodeId, Rpc, Term, NONE_INDEX};
use crate::state::{Role, ServerState};

/// Dispatches one [`Event`] to the appropriate handler. This is the single entry point the
/// runtime harness' event loop calls.
pub fn handle_event(
    state: &mut ServerState,
    control: &mut Control,
    event: Event,
) -> Result<(), RaftError> {
    match event {
        Event::Internal(Internal::ClientAppendEntry(item)) => handle_client_append(state, control, item),
        Event::Internal(Internal::RaftDebug) => {
            print_raft_debug(state, control);
            Ok(())
        }
        Event::Heartbeat => {
            on_heartbeat(state, control);
            Ok(())
        }
        Event::ElectionTimeout => {
            on_election_timeout(state, control);
            Ok(())
        }
        Event::Network(msg) => {
            dispatch_network(state, control, msg);
            Ok(())
        }
    }
}

//
// -- role transitions --
//

fn become_follower(state: &mut ServerState, control: &Control) {
    state.role = Role::Follower;
    state.voted_for = None;
    info!("{} BECAME FOLLOWER", control.address);
}

fn become_candidate(state: &mut ServerState, control: &mut Control) {
    state.role = Role::Candidate;
    state.current_term += 1;
    state.voted_for = Some(control.address);
    state.votes_granted.clear();
    info!("{} BECAME CANDIDATE", control.address);

    let last_log_index = state.log.last_index();
    let last_log_term = state.log.last_term();
    let term = state.current_term;
    let address = control.address;
    control.broadcast(|peer| Message {
        source: address,
        dest: peer,
        term,
        rpc: Rpc::RequestVote {
            last_log_index,
            last_log_term,
        },
    });
}

fn become_leader(state: &mut ServerState, control: &mut Control) {
    state.role = Role::Leader;
    let next = state.log.len() as Index;
    state.next_index.clear();
    state.match_index.clear();
    for peer in control.peers.iter() {
        state.next_index.insert(*peer, next);
        state.match_index.insert(*peer, NONE_INDEX);
    }
    info!("{} BECAME LEADER", control.address);
    send_all_append_entries(state, control);
}

//
// -- timer handlers --
//

fn on_heartbeat(state: &mut ServerState, control: &mut Control) {
    if state.role == Role::Leader {
        send_all_append_entries(state, control);
    }
}

fn on_election_timeout(state: &mut ServerState, control: &mut Control) {
    if state.role == Role::Leader {
        return;
    }
    if state.heard_from_leader {
        state.heard_from_leader = false;
    } else {
        become_candidate(state, control);
    }
}

//
// -- message send --
//

fn send_one_append_entries(state: &mut ServerState, control: &mut Control, node: NodeId) {
    let next = *state.next_index.get(&node).unwrap_or(&0);
    let prev_index = next - 1;
    let prev_term = if prev_index >= 0 {
        state.log.term_at(prev_index).unwrap_or(NONE_INDEX)
    } else {
        NONE_INDEX
    };
    let entries = state.log.entries_from(next).to_vec();
    control.send(Message {
        source: control.address,
        dest: node,
        term: state.current_term,
        rpc: Rpc::AppendEntries {
            prev_index,
            prev_term,
            entries,
            commit_index: state.commit_index,
        },
    });
}

fn send_all_append_entries(state: &mut ServerState, control: &mut Control) {
    let peers: Vec<NodeId> = control.peers.iter().copied().collect();
    for peer in peers {
        send_one_append_entries(state, control, peer);
    }
}

//
// -- client append --
//

fn handle_client_append(
    state: &mut ServerState,
    control: &Control,
    item: Vec<u8>,
) -> Result<(), RaftError> {
    if state.role != Role::Leader {
        return Err(RaftError::NotLeader(control.address));
    }
    let entry = LogEntry {
        term: state.current_term,
        item,
    };
    let prev_index = state.log.last_index();
    let prev_term = state.log.last_term();
    let appended = state.log.append(prev_index, prev_term, &[entry]);
    debug_assert!(appended, "a leader's own append at its own log tail always succeeds");
    debug!(
        "{} appended client entry at index {}",
        control.address,
        state.log.last_index()
    );
    Ok(())
}

//
// -- incoming message dispatch --
//

fn dispatch_network(state: &mut ServerState, control: &mut Control, msg: Message) {
    if msg.term > state.current_term {
        state.current_term = msg.term;
        become_follower(state, control);
    }
    if msg.term < state.current_term {
        trace!("{} dropping stale message {}", control.address, msg);
        return;
    }

    match msg.rpc.clone() {
        Rpc::AppendEntries {
            prev_index,
            prev_term,
            entries,
            commit_index,
        } => on_append_entries(state, control, &msg, prev_index, prev_term, &entries, commit_index),
        Rpc::AppendEntriesResponse {
            success,
            match_index,
        } => on_append_entries_response(state, control, msg.source, success, match_index),
        Rpc::RequestVote {
            last_log_index,
            last_log_term,
        } => on_request_vote(state, control, &msg, last_log_index, last_log_term),
        Rpc::RequestVoteResponse { vote_granted } => {
            on_request_vote_response(state, control, msg.source, vote_granted)
        }
    }
}

//
// -- network handlers --
//

fn on_append_entries(
    state: &mut ServerState,
    control: &mut Control,
    msg: &Message,
    prev_index: Index,
    prev_term: Term,
    entries: &[LogEntry],
    leader_commit_index: Index,
) {
    if state.role == Role::Candidate {
        become_follower(state, control);
    }

    // Election safety rules out a second leader at this term; a Leader reaching this point
    // would mean two leaders share a term, which must never happen. Reject rather than mutate.
    let success = match state.role {
        Role::Follower => state.log.append(prev_index, prev_term, entries),
        Role::Candidate | Role::Leader => false,
    };
    let match_index = if success {
        prev_index + entries.len() as Index
    } else {
        NONE_INDEX
    };

    if success && leader_commit_index > state.commit_index {
        state.commit_index = leader_commit_index.min(state.log.last_index());
        apply_state_machine(state, control);
    }
    state.heard_from_leader = true;

    control.send(Message {
        source: control.address,
        dest: msg.source,
        term: state.current_term,
        rpc: Rpc::AppendEntriesResponse {
            success,
            match_index,
        },
    });
}

fn on_append_entries_response(
    state: &mut ServerState,
    control: &mut Control,
    src: NodeId,
    success: bool,
    match_index: Index,
) {
    if state.role != Role::Leader {
        return;
    }
    if success {
        state.next_index.insert(src, match_index + 1);
        state.match_index.insert(src, match_index);
        advance_commit_index(state, control);
    } else {
        let next = state.next_index.entry(src).or_insert(0);
        *next = (*next - 1).max(0);
        send_one_append_entries(state, control, src);
    }
}

/// §4.6's commit-advance rule: a leader only commits by counting replicas when the entry at
/// the candidate commit index was written in its own current term (never commits a previous
/// leader's entry purely by replica count).
fn advance_commit_index(state: &mut ServerState, control: &mut Control) {
    let mut match_indices: Vec<Index> = control
        .peers
        .iter()
        .map(|p| *state.match_index.get(p).unwrap_or(&NONE_INDEX))
        .collect();
    if match_indices.is_empty() {
        return;
    }
    match_indices.sort_unstable();
    let m = match_indices[match_indices.len() / 2];

    if m > state.commit_index {
        if let Some(term) = state.log.term_at(m) {
            if term == state.current_term {
                state.commit_index = m;
                apply_state_machine(state, control);
            }
        }
    }
}

fn on_request_vote(
    state: &mut ServerState,
    control: &mut Control,
    msg: &Message,
    last_log_index: Index,
    last_log_term: Term,
) {
    let my_last_log_term = state.log.last_term();
    let my_last_log_index = state.log.last_index();
    let log_is_up_to_date = last_log_term > my_last_log_term
        || (last_log_term == my_last_log_term && last_log_index >= my_last_log_index);
    let can_vote = state.voted_for.is_none() || state.voted_for == Some(msg.source);
    let grant = can_vote && log_is_up_to_date;

    if grant {
        state.voted_for = Some(msg.source);
    }

    control.send(Message {
        source: control.address,
        dest: msg.source,
        term: state.current_term,
        rpc: Rpc::RequestVoteResponse {
            vote_granted: grant,
        },
    });
}

fn on_request_vote_response(
    state: &mut ServerState,
    control: &mut Control,
    src: NodeId,
    vote_granted: bool,
) {
    if state.role != Role::Candidate {
        return;
    }
    if vote_granted {
        state.votes_granted.insert(src);
    }
    if state.votes_granted.len() >= control.vote_majority() {
        become_leader(state, control);
    }
}

//
// -- state-machine application --
//

fn apply_state_machine(state: &mut ServerState, control: &mut Control) {
    if state.commit_index > state.last_applied {
        let entries = state
            .log
            .entries_range_inclusive(state.last_applied + 1, state.commit_index)
            .to_vec();
        control.apply(&entries);
        state.last_applied = state.commit_index;
    }
}

fn print_raft_debug(state: &ServerState, control: &Control) {
    println!(
        "{} role={:?} term={} voted_for={:?} commit_index={} last_applied={} log_len={}",
        control.address,
        state.role,
        state.current_term,
        state.voted_for,
        state.commit_index,
        state.last_applied,
        state.log.len(),
    );
}
