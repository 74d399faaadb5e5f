//! The throughput client: connect, request a timed transfer, then measure
//! the receive rate until the server closes the connection.

use crate::error::{Error, Result};
use crate::logging::LogSink;
use crate::metrics::{format_final_average, format_interim, RateSample, REPORT_INTERVAL};
use crate::net::{recv_all, send_all};
use crate::protocol::TransferRequest;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::debug;

/// What one completed transfer measured.
#[derive(Debug, Clone)]
pub struct TransferSummary {
    /// Total bytes received before EOF.
    pub total_bytes: u64,
    /// Wall-clock time from after the request was sent until EOF.
    pub elapsed: Duration,
    /// How many times the receive loop completed and consulted the clock.
    pub timer_calls: u64,
    /// Cumulative byte counts captured at each interim report.
    pub interim_totals: Vec<u64>,
}

/// Connects to a server and measures one timed transfer.
pub struct ThroughputClient {
    remote_ip: Ipv4Addr,
    port: u16,
    request: TransferRequest,
    sink: Arc<dyn LogSink>,
}

impl ThroughputClient {
    pub fn new(
        remote_ip: Ipv4Addr,
        port: u16,
        request: TransferRequest,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            remote_ip,
            port,
            request,
            sink,
        }
    }

    /// Connect and run the transfer.
    ///
    /// A connection failure is fatal and carries the OS error code so the
    /// caller can surface it as the process exit code.
    pub async fn run(&self) -> Result<TransferSummary> {
        self.sink.log(&format!(
            "Client parameters: remoteip={} secs={} bytesPerBuf={} msg={}",
            self.remote_ip, self.request.duration_secs, self.request.bytes_per_buf,
            self.request.message
        ));

        let addr = SocketAddr::from((self.remote_ip, self.port));
        self.sink
            .log(&format!("Connecting to {} port {}", self.remote_ip, self.port));
        let mut stream = TcpStream::connect(addr).await.map_err(Error::Connect)?;
        self.sink
            .log(&format!("Connected to  {} port {}", self.remote_ip, self.port));

        self.transfer(&mut stream).await
    }

    /// Send the control frame, then receive until the server closes the
    /// connection, reporting an interim rate roughly once a second.
    ///
    /// Any receive failure other than a clean EOF (including the bounded
    /// receive timing out) ends the session immediately with no final
    /// report.
    pub async fn transfer<S>(&self, stream: &mut S) -> Result<TransferSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        send_all(stream, &self.request.encode()).await?;

        let mut buf = vec![0u8; self.request.bytes_per_buf];
        let started = Instant::now();
        let mut last_report = started;
        let mut total_bytes: u64 = 0;
        let mut bytes_since_report: u64 = 0;
        let mut timer_calls: u64 = 0;
        let mut interim_totals = Vec::new();

        loop {
            let outcome = recv_all(stream, &mut buf).await?;
            let now = Instant::now();
            timer_calls += 1;
            total_bytes += outcome.bytes() as u64;
            bytes_since_report += outcome.bytes() as u64;

            let since_report = now.duration_since(last_report);
            if outcome.bytes() > 0 && since_report >= REPORT_INTERVAL {
                let sample = RateSample::new(bytes_since_report, since_report);
                self.sink.log(&format_interim(&sample));
                interim_totals.push(total_bytes);
                last_report = now;
                bytes_since_report = 0;
            }

            if outcome.is_eof() {
                let elapsed = now.duration_since(started);
                let sample = RateSample::new(total_bytes, elapsed);
                self.sink.log(&format_final_average(&sample, timer_calls));
                debug!("transfer complete after {} receive iterations", timer_calls);
                return Ok(TransferSummary {
                    total_bytes,
                    elapsed,
                    timer_calls,
                    interim_totals,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_support::CapturingSink;
    use crate::net::read_control_line;
    use crate::payload;
    use tokio::io::AsyncWriteExt;

    fn test_client(nbytes: usize, sink: Arc<CapturingSink>) -> ThroughputClient {
        ThroughputClient::new(
            Ipv4Addr::LOCALHOST,
            54811,
            TransferRequest {
                duration_secs: 1,
                bytes_per_buf: nbytes,
                message: "unit".to_string(),
            },
            sink,
        )
    }

    #[tokio::test]
    async fn test_transfer_reports_final_average_once_after_eof() {
        let sink = Arc::new(CapturingSink::default());
        let client = test_client(64, sink.clone());

        let (mut near, mut far) = tokio::io::duplex(8192);
        let peer = tokio::spawn(async move {
            let frame = read_control_line(&mut far).await.unwrap();
            assert_eq!(frame, b"send|1|64|unit|\n");
            far.write_all(&payload::generate(64).repeat(5)).await.unwrap();
            // Dropping the stream is the clean end-of-data signal.
        });

        let summary = client.transfer(&mut near).await.unwrap();
        peer.await.unwrap();

        assert_eq!(summary.total_bytes, 5 * 64);
        assert!(summary.timer_calls >= 1);

        let finals: Vec<_> = sink
            .lines()
            .into_iter()
            .filter(|l| l.contains("final average"))
            .collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(sink.lines().last().unwrap(), &finals[0]);
    }

    #[tokio::test]
    async fn test_transfer_counts_partial_final_buffer() {
        let sink = Arc::new(CapturingSink::default());
        let client = test_client(100, sink);

        let (mut near, mut far) = tokio::io::duplex(8192);
        tokio::spawn(async move {
            read_control_line(&mut far).await.unwrap();
            // 250 bytes: two full buffers plus a 50-byte tail before EOF.
            far.write_all(&vec![9u8; 250]).await.unwrap();
        });

        let summary = client.transfer(&mut near).await.unwrap();
        assert_eq!(summary.total_bytes, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_server_is_fatal_with_no_final_report() {
        let sink = Arc::new(CapturingSink::default());
        let client = test_client(64, sink.clone());

        let (mut near, mut far) = tokio::io::duplex(8192);
        tokio::spawn(async move {
            read_control_line(&mut far).await.unwrap();
            // Hold the connection open without ever sending data.
            std::future::pending::<()>().await;
            drop(far);
        });

        let err = client.transfer(&mut near).await.unwrap_err();
        assert!(matches!(err, Error::RecvTimeout));
        assert!(sink.lines().iter().all(|l| !l.contains("final average")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interim_totals_are_monotonic() {
        let sink = Arc::new(CapturingSink::default());
        let client = test_client(64, sink.clone());

        let (mut near, mut far) = tokio::io::duplex(8192);
        tokio::spawn(async move {
            read_control_line(&mut far).await.unwrap();
            for _ in 0..4 {
                far.write_all(&payload::generate(64)).await.unwrap();
                tokio::time::sleep(Duration::from_millis(1100)).await;
            }
        });

        let summary = client.transfer(&mut near).await.unwrap();

        assert!(!summary.interim_totals.is_empty());
        assert!(summary
            .interim_totals
            .windows(2)
            .all(|pair| pair[0] <= pair[1]));
        assert!(*summary.interim_totals.last().unwrap() <= summary.total_bytes);
        assert!(sink.lines().iter().any(|l| l.contains("MB/sec")));
    }
}
