//! The throughput server: accept one connection at a time, decode the
//! control frame, and stream generated data for the requested duration.

use crate::error::Result;
use crate::logging::LogSink;
use crate::metrics::{format_session_total, RateSample};
use crate::net::{read_control_line, send_all};
use crate::payload;
use crate::protocol::TransferRequest;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Streams generated data to one client at a time, forever.
pub struct ThroughputServer {
    listener: TcpListener,
    port: u16,
    sink: Arc<dyn LogSink>,
}

impl ThroughputServer {
    /// Bind the listening socket.
    ///
    /// The listen backlog is zero: the purpose of the tool is to measure
    /// total throughput, so a second client must wait at the OS level
    /// rather than be served concurrently. `tokio::net::TcpListener::bind`
    /// hardcodes its backlog, so the socket is built with socket2.
    pub fn bind(port: u16, sink: Arc<dyn LogSink>) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let socket = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::STREAM,
            Some(socket2::Protocol::TCP),
        )?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(0)?;

        let std_listener: std::net::TcpListener = socket.into();
        std_listener.set_nonblocking(true)?;
        let listener = TcpListener::from_std(std_listener)?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            listener,
            port,
            sink,
        })
    }

    /// The port actually bound, which differs from the requested one when
    /// binding port 0.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accept and serve connections until the process is shut down.
    ///
    /// Accept errors and per-session errors are logged and the loop
    /// continues; only process shutdown ends it.
    pub async fn run(&self) -> Result<()> {
        loop {
            self.sink.log(&format!(
                "Waiting to accept a connection on port {}",
                self.port
            ));
            match self.listener.accept().await {
                Err(e) => {
                    error!("accept failed: {}", e);
                    continue;
                }
                Ok((mut stream, peer)) => {
                    debug!("accepted connection from {}", peer);
                    self.sink.log("Accepted connection");
                    if let Err(e) = self.serve_session(&mut stream).await {
                        warn!("session aborted: {}", e);
                    }
                    self.sink.log("Client connection closed.");
                    self.sink.flush();
                }
            }
        }
    }

    /// Run one session on an accepted connection: negotiate, stream, and
    /// log the final throughput.
    ///
    /// Generic over the stream so tests can drive it with an in-memory
    /// pipe. An error before streaming starts aborts the session with no
    /// summary line; a send error mid-stream ends the loop early and the
    /// summary still covers what was sent.
    pub async fn serve_session<S>(&self, stream: &mut S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let line = read_control_line(stream).await?;

        // Decode never rejects a session. A frame with nothing usable in
        // it yields an all-defaults request and a near-instant transfer.
        let req = TransferRequest::decode(&line).unwrap_or(TransferRequest {
            duration_secs: 0,
            bytes_per_buf: 0,
            message: String::new(),
        });
        self.sink.log(&format!(
            "Client says send for {} secs; {} bytes per send; msg: {}",
            req.duration_secs, req.bytes_per_buf, req.message
        ));

        let buf = payload::generate(req.bytes_per_buf);
        let duration = Duration::from_secs(u64::from(req.duration_secs));
        let started = Instant::now();
        let mut total_sent: u64 = 0;
        let mut sends: u64 = 0;

        // The same buffer is sent repeatedly; at least once, so that a
        // zero-second request still exercises the path end to end.
        loop {
            if let Err(e) = send_all(stream, &buf).await {
                warn!("error sending buffer: {}", e);
                break;
            }
            total_sent += buf.len() as u64;
            sends += 1;
            if started.elapsed() >= duration {
                break;
            }
        }

        let sample = RateSample::new(total_sent, started.elapsed());
        debug!("{} sends this session", sends);
        self.sink.log(&format_session_total(&sample));
        Ok(())
    }
}
