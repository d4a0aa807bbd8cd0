//! Size-prefixed wire framing: a 10-byte ASCII decimal length field (right-justified,
//! space-padded) followed by exactly that many bytes of payload. The payload itself is
//! encoded with `bincode`, which round-trips the tagged `Message`/`Rpc` variants (field
//! names and all, including nested entry lists) without either endpoint needing a schema.
//!
//! Both sides of the connection are ordinary blocking sockets (§5 of the harness spec:
//! a listener's accept and a connection's read are suspension points, not something that
//! needs a poll loop), so a short read just means `read_exact` blocks until the rest of
//! the frame arrives or the peer goes away — there is no partial state to carry between
//! calls.

use std::io::{self, Read, Write};

use raft::message::Message;

use crate::error::TransportError;

const LENGTH_WIDTH: usize = 10;

pub fn encode_frame(message: &Message) -> Result<Vec<u8>, TransportError> {
    let payload = bincode::serialize(message)?;
    if payload.len() as u64 >= 10u64.pow(LENGTH_WIDTH as u32) {
        return Err(TransportError::FrameTooLarge(payload.len()));
    }
    let mut frame = format!("{:>width$}", payload.len(), width = LENGTH_WIDTH).into_bytes();
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub fn write_frame(stream: &mut impl Write, message: &Message) -> Result<(), TransportError> {
    let frame = encode_frame(message)?;
    stream.write_all(&frame)?;
    Ok(())
}

/// Reads one frame from `stream`, blocking until it arrives. Returns `Ok(None)` if the
/// peer closed the connection cleanly before sending any bytes of a new frame (the
/// ordinary end of a connection, not a protocol violation). Any other truncation — the
/// peer going away mid-frame — is `Err`, since a partially-received frame cannot be
/// resumed by a later call on the same stream. A length prefix that fails to parse as an
/// integer is a protocol violation (§7): the caller should close the connection.
pub fn read_frame(stream: &mut impl Read) -> Result<Option<Message>, TransportError> {
    let mut len_buf = [0u8; LENGTH_WIDTH];
    if let Err(err) = read_exact_or_clean_eof(stream, &mut len_buf) {
        return match err {
            ReadError::CleanEof => Ok(None),
            ReadError::Io(err) => Err(err.into()),
        };
    }

    let len_str = std::str::from_utf8(&len_buf).map_err(|_| TransportError::BadLengthPrefix)?;
    let len: usize = len_str.trim().parse().map_err(|_| TransportError::BadLengthPrefix)?;

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload)?;

    let message = bincode::deserialize(&payload)?;
    Ok(Some(message))
}

enum ReadError {
    /// Zero bytes were read before the peer closed — a clean end of stream.
    CleanEof,
    Io(io::Error),
}

/// Like `Read::read_exact`, but distinguishes "the peer closed before we read anything"
/// from every other I/O failure, so the caller can treat the former as a normal
/// connection close rather than a truncated frame.
fn read_exact_or_clean_eof(stream: &mut impl Read, buf: &mut [u8]) -> Result<(), ReadError> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Err(ReadError::CleanEof),
            Ok(0) => {
                return Err(ReadError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                )))
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ReadError::Io(err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use raft::message::Rpc;

    use super::*;

    fn sample() -> Message {
        Message {
            source: 0,
            dest: 1,
            term: 1,
            rpc: Rpc::RequestVoteResponse { vote_granted: true },
        }
    }

    #[test]
    fn a_fully_written_frame_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &sample()).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).unwrap(), Some(sample()));
    }

    #[test]
    fn a_connection_closed_before_any_bytes_is_a_clean_eof() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert_eq!(read_frame(&mut cursor).unwrap(), None);
    }

    #[test]
    fn a_connection_closed_mid_frame_is_an_error_not_a_clean_eof() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &sample()).unwrap();
        let truncated = buf[..14].to_vec(); // length prefix plus a few payload bytes
        let mut cursor = Cursor::new(truncated);

        assert!(read_frame(&mut cursor).is_err());
    }

    #[test]
    fn a_non_numeric_length_prefix_is_a_protocol_violation() {
        let mut bogus = b"not-a-len!".to_vec();
        bogus.extend_from_slice(b"trailing");
        let mut cursor = Cursor::new(bogus);

        let err = read_frame(&mut cursor).expect_err("a non-numeric length prefix must be rejected");
        assert!(matches!(err, TransportError::BadLengthPrefix));
    }
}
