//! netthru - measure TCP throughput between two hosts.
//!
//! One copy of the program runs in server mode and one in client mode. The
//! server streams generated data as fast as it can for the duration the
//! client requested; the client measures and reports the receive rate.

use anyhow::Result;
use clap::Parser;
use netthru::{
    cli::{Args, Mode},
    client::ThroughputClient,
    logging::{ColorizedFormatter, FileConsoleSink, LogSink},
    protocol::TransferRequest,
    server::ThroughputServer,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostic logging goes through tracing; the measurement log lines
    // themselves go through the LogSink. RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .event_format(ColorizedFormatter)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    args.validate()?;
    info!("netthru {} starting in {} mode", netthru::VERSION, args.mode);

    let sink = Arc::new(FileConsoleSink::open(&args.log_file_path())?);

    let result = match args.mode {
        Mode::Server => {
            let server = ThroughputServer::bind(args.port, sink.clone())?;
            server.run().await
        }
        Mode::Client => {
            let request = TransferRequest {
                duration_secs: args.secs,
                bytes_per_buf: args.nbytes,
                message: args.msg.clone(),
            };
            // clap requires remote-ip whenever mode is client.
            let remote_ip = args
                .remote_ip
                .ok_or_else(|| anyhow::anyhow!("remote-ip is required in client mode"))?;
            let client = ThroughputClient::new(remote_ip, args.port, request, sink.clone());
            client.run().await.map(|_| ())
        }
    };

    sink.flush();

    if let Err(e) = result {
        error!("{}", e);
        // Connect failures surface the raw OS error code, so scripts can
        // tell ECONNREFUSED from EHOSTUNREACH.
        std::process::exit(e.os_error_code().unwrap_or(1));
    }
    Ok(())
}
