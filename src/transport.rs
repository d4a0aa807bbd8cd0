//! TCP listener and per-peer sender tasks: the only code in the harness that touches
//! sockets directly. Every task here talks to the event loop exclusively through
//! crossbeam-channel; none of them ever touches `ServerState`/`Control` (§5).
//!
//! Every socket here is an ordinary blocking one: accept, read, and write are each a
//! suspension point the harness spec names explicitly, and a blocking thread per
//! connection satisfies that without any poll loop or partial-read bookkeeping.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use raft::message::{Event, Message};

use crate::wire::{read_frame, write_frame};

const BIND_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Binds `addr` and spawns one reader thread per accepted connection, each forwarding
/// decoded messages as `Event::Network` onto `inbound` — the event loop's single inbound
/// queue. Retries the bind on failure (the peer that should own this port may not have
/// released it yet); runs until the process exits (§5: no graceful shutdown is wired up).
pub fn spawn_listener(addr: SocketAddr, inbound: Sender<Event>) {
    thread::spawn(move || loop {
        match TcpListener::bind(addr) {
            Ok(listener) => {
                accept_loop(&listener, &inbound);
                return;
            }
            Err(err) => {
                log::warn!("listener bind to {} failed: {}; retrying", addr, err);
                thread::sleep(BIND_RETRY_DELAY);
            }
        }
    });
}

fn accept_loop(listener: &TcpListener, inbound: &Sender<Event>) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => spawn_reader(stream, inbound.clone()),
            Err(err) => log::warn!("accept failed: {}", err),
        }
    }
}

fn spawn_reader(mut stream: TcpStream, inbound: Sender<Event>) {
    thread::spawn(move || loop {
        match read_frame(&mut stream) {
            Ok(Some(msg)) => {
                if inbound.send(Event::Network(msg)).is_err() {
                    return; // event loop is gone; process is shutting down
                }
            }
            Ok(None) => return, // peer closed the connection cleanly
            Err(err) => {
                log::warn!("closing connection after a framing error: {}", err);
                return;
            }
        }
    });
}

/// One outbound channel per peer: owns a lazily-opened socket and retries on the next
/// queued message after any connect/send failure (§5) rather than blocking or retrying
/// the same message in a loop — a down peer never stalls this thread for long, and it
/// never blocks the event loop or any other peer's sender.
pub fn spawn_sender(addr: SocketAddr, outbound: Receiver<Message>) {
    thread::spawn(move || {
        let mut socket: Option<TcpStream> = None;
        for message in outbound.iter() {
            if socket.is_none() {
                socket = TcpStream::connect(addr).ok();
            }
            match socket.as_mut() {
                None => log::debug!("peer {} unreachable; dropping message", addr),
                Some(stream) => {
                    if let Err(err) = write_frame(stream, &message) {
                        log::debug!("send to {} failed, resetting connection: {}", addr, err);
                        socket = None;
                    }
                }
            }
        }
    });
}
