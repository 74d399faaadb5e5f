//! Socket read/write primitives for the throughput loops.
//!
//! These are the load-bearing I/O helpers: a total-or-error send that loops
//! on partial writes, and a bounded receive with a per-iteration readiness
//! timeout that distinguishes a full buffer from a clean EOF from a stalled
//! peer. Both are generic over the stream so tests can drive them with
//! in-memory pipes.

use crate::error::{Error, Result};
use crate::protocol::MAX_FRAME_LEN;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// How long one receive iteration may wait for the socket to become
/// readable before the call is treated as failed.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a bounded receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// The buffer was completely filled.
    Filled(usize),
    /// The peer closed the connection cleanly; the count is how many bytes
    /// were accumulated before EOF (may be less than the buffer size).
    Eof(usize),
}

impl RecvOutcome {
    pub fn bytes(&self) -> usize {
        match *self {
            RecvOutcome::Filled(n) | RecvOutcome::Eof(n) => n,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, RecvOutcome::Eof(_))
    }
}

/// Send the whole buffer, looping on partial writes.
///
/// Never reports success with fewer bytes sent than requested; an error
/// from the underlying stream is returned immediately, with the offset of
/// the last successful write abandoned.
pub async fn send_all<W>(stream: &mut W, buf: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut offset = 0;
    while offset < buf.len() {
        let sent = stream.write(&buf[offset..]).await?;
        if sent == 0 {
            return Err(Error::Transport("peer stopped accepting data".into()));
        }
        offset += sent;
    }
    Ok(())
}

/// Read up to `buf.len()` bytes, waiting at most [`RECV_TIMEOUT`] per
/// iteration for data to arrive.
///
/// Three outcomes, which callers branch on:
/// - the buffer fills completely ([`RecvOutcome::Filled`]),
/// - the peer closes mid-buffer ([`RecvOutcome::Eof`] with the partial
///   count),
/// - no data arrives within the timeout ([`Error::RecvTimeout`]).
pub async fn recv_all<R>(stream: &mut R, buf: &mut [u8]) -> Result<RecvOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let read = match timeout(RECV_TIMEOUT, stream.read(&mut buf[filled..])).await {
            Err(_) => return Err(Error::RecvTimeout),
            Ok(Err(e)) => return Err(Error::Io(e)),
            Ok(Ok(n)) => n,
        };
        if read == 0 {
            return Ok(RecvOutcome::Eof(filled));
        }
        filled += read;
    }
    Ok(RecvOutcome::Filled(filled))
}

/// Read the negotiation line: bytes accumulate until a newline is seen or
/// [`MAX_FRAME_LEN`] bytes arrive.
///
/// A disconnect before the newline is a protocol error; the caller aborts
/// the session. No timeout applies here, matching the rest of the
/// negotiation path.
pub async fn read_control_line<R>(stream: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut line = Vec::with_capacity(MAX_FRAME_LEN);
    let mut byte = [0u8; 1];
    while line.len() < MAX_FRAME_LEN {
        let read = stream.read(&mut byte).await?;
        if read == 0 {
            return Err(Error::Protocol("unexpected early end of stream".into()));
        }
        line.push(byte[0]);
        if byte[0] == b'\n' {
            break;
        }
    }
    Ok(line)
}
