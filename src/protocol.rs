//! Control-frame encoding for the throughput protocol.
//!
//! A session begins with the client sending a single pipe-delimited ASCII
//! line:
//!
//! ```text
//! send|<seconds>|<bytes_per_buf>|<message>|\n
//! ```
//!
//! After this line the server streams raw bytes with no further framing
//! until it closes the connection.

/// The command tag sent at the start of every control frame.
pub const COMMAND_SEND: &str = "send";

/// Upper bound on the control frame, including the trailing newline.
/// The server stops reading the negotiation once this many bytes arrive.
pub const MAX_FRAME_LEN: usize = 256;

/// Parameters for one timed transfer, as requested by the client.
///
/// Immutable after creation; serialized exactly once into the control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// How long the server should keep sending, in whole seconds.
    pub duration_secs: u32,
    /// Size of each buffer the server sends.
    pub bytes_per_buf: usize,
    /// Arbitrary client-supplied text for the server to log.
    pub message: String,
}

impl TransferRequest {
    /// Encode the request as a control frame.
    ///
    /// `|` and `\n` inside `message` are not escaped; callers must avoid
    /// them. This is a documented limitation of the wire format, not a
    /// validated one.
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|\n",
            COMMAND_SEND, self.duration_secs, self.bytes_per_buf, self.message
        )
        .into_bytes()
    }

    /// Decode a control frame.
    ///
    /// Decoding is deliberately forgiving: the leading tag is accepted as
    /// long as it is non-empty (it is not compared against "send"), and any
    /// missing or unparseable trailing token defaults its field to
    /// zero/empty. A malformed frame therefore yields a request with
    /// `bytes_per_buf == 0` and the server runs a near-instant transfer
    /// instead of rejecting the connection.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(frame);
        let text = text.trim_end_matches('\n');
        let mut tokens = text.split('|');

        // Any non-empty first token is treated as the command tag.
        tokens.next().filter(|tag| !tag.is_empty())?;

        let duration_secs = tokens
            .next()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0);
        let bytes_per_buf = tokens
            .next()
            .and_then(|t| t.trim().parse().ok())
            .unwrap_or(0);
        let message = tokens.next().unwrap_or("").to_string();

        Some(TransferRequest {
            duration_secs,
            bytes_per_buf,
            message,
        })
    }
}
