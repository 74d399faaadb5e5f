//! # netthru
//!
//! A point-to-point TCP throughput measurement tool. One copy of the program
//! runs in server mode and streams generated data on demand; the other runs
//! in client mode, requests a timed transfer, and reports the measured rate.
//!
//! ## Architecture Overview
//!
//! The library is organized into several key modules:
//!
//! - `protocol`: the single pipe-delimited control frame exchanged at
//!   session start
//! - `payload`: deterministic printable-ASCII payload generation
//! - `net`: the total-or-error send loop and the bounded receive loop
//! - `server`: the accept/negotiate/stream loop (one connection at a time)
//! - `client`: connect, request, receive, and rate reporting
//! - `metrics`: rate samples and MB/s / Mb/s formatting
//! - `logging`: the `LogSink` abstraction and the file+console sink
//!
//! ## Concurrency Model
//!
//! Sessions are strictly sequential: the server listens with a backlog of
//! zero so a concurrent client cannot dilute the throughput measurement.
//! Tokio is used for I/O plumbing, not for parallelism; there is never more
//! than one live transfer.

pub mod cli;
pub mod client;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod net;
pub mod payload;
pub mod protocol;
pub mod server;

pub use cli::{Args, Mode};
pub use client::{ThroughputClient, TransferSummary};
pub use error::{Error, Result};
pub use logging::{FileConsoleSink, LogSink};
pub use metrics::RateSample;
pub use protocol::TransferRequest;
pub use server::ThroughputServer;

/// The current version of netthru, populated from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values.
pub mod defaults {
    /// Default TCP port for both modes.
    pub const PORT: u16 = 54811;

    /// Default number of seconds the server sends for.
    pub const SECS: u32 = 10;

    /// Default per-send buffer size requested from the server.
    ///
    /// 12 KiB keeps each send call cheap while staying large enough that
    /// the loop overhead does not dominate the measurement.
    pub const BYTES_PER_BUF: usize = 12288;

    /// Default log file for server mode.
    pub const SERVER_LOG_FILE: &str = "netthruserver.log";

    /// Default log file for client mode.
    pub const CLIENT_LOG_FILE: &str = "netthruclient.log";
}
