use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// netthru - measure TCP throughput between two hosts
///
/// Run two copies of this program, one in server mode and one in client
/// mode. Server mode is simple because the server takes its directions from
/// the client.
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Role to run as
    #[clap(short = 'm', long, value_enum)]
    pub mode: Mode,

    /// TCP port
    #[clap(short = 'p', long, default_value_t = crate::defaults::PORT)]
    pub port: u16,

    /// Number of seconds for which the server should send (client mode)
    #[clap(short = 's', long, default_value_t = crate::defaults::SECS)]
    pub secs: u32,

    /// Number of bytes the server should send at once (client mode)
    #[clap(short = 'n', long, default_value_t = crate::defaults::BYTES_PER_BUF)]
    pub nbytes: usize,

    /// IPv4 address of the server (client mode)
    #[clap(short = 'r', long, required_if_eq("mode", "client"))]
    pub remote_ip: Option<Ipv4Addr>,

    /// Arbitrary message for the server to log (client mode)
    #[clap(long, default_value = "")]
    pub msg: String,

    /// Log file path; defaults to a mode-specific file in the working
    /// directory
    #[clap(long)]
    pub log_file: Option<PathBuf>,
}

/// Which role this process plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Stream generated data to whoever connects
    #[clap(name = "server")]
    Server,

    /// Connect, request a timed transfer, and measure the rate
    #[clap(name = "client")]
    Client,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Server => write!(f, "server"),
            Mode::Client => write!(f, "client"),
        }
    }
}

impl Args {
    /// The log file to append to, honoring the mode-specific default.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            PathBuf::from(match self.mode {
                Mode::Server => crate::defaults::SERVER_LOG_FILE,
                Mode::Client => crate::defaults::CLIENT_LOG_FILE,
            })
        })
    }

    /// Reject argument combinations the transfer loops cannot work with.
    ///
    /// The control frame tolerates a zero buffer size on the wire, but a
    /// client asking for one would measure nothing, so it is refused here.
    pub fn validate(&self) -> Result<()> {
        if self.mode == Mode::Client && self.nbytes == 0 {
            anyhow::bail!("nbytes must be greater than zero");
        }
        if self.msg.contains('|') || self.msg.contains('\n') {
            anyhow::bail!("msg must not contain '|' or newline characters");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Server.to_string(), "server");
        assert_eq!(Mode::Client.to_string(), "client");
    }

    #[test]
    fn test_server_mode_parses_without_remote_ip() {
        let args = Args::try_parse_from(["netthru", "--mode", "server"]).unwrap();
        assert_eq!(args.mode, Mode::Server);
        assert_eq!(args.port, 54811);
    }

    #[test]
    fn test_client_mode_requires_remote_ip() {
        assert!(Args::try_parse_from(["netthru", "--mode", "client"]).is_err());

        let args =
            Args::try_parse_from(["netthru", "--mode", "client", "--remote-ip", "10.0.0.2"])
                .unwrap();
        assert_eq!(args.remote_ip, Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(args.secs, 10);
        assert_eq!(args.nbytes, 12288);
    }

    #[test]
    fn test_log_file_defaults_by_mode() {
        let server = Args::try_parse_from(["netthru", "--mode", "server"]).unwrap();
        assert_eq!(server.log_file_path(), PathBuf::from("netthruserver.log"));

        let client =
            Args::try_parse_from(["netthru", "--mode", "client", "--remote-ip", "10.0.0.2"])
                .unwrap();
        assert_eq!(client.log_file_path(), PathBuf::from("netthruclient.log"));

        let custom = Args::try_parse_from([
            "netthru",
            "--mode",
            "server",
            "--log-file",
            "/tmp/custom.log",
        ])
        .unwrap();
        assert_eq!(custom.log_file_path(), PathBuf::from("/tmp/custom.log"));
    }

    #[test]
    fn test_validate_rejects_zero_nbytes_for_client() {
        let mut args = Args::try_parse_from([
            "netthru",
            "--mode",
            "client",
            "--remote-ip",
            "10.0.0.2",
            "--nbytes",
            "0",
        ])
        .unwrap();
        assert!(args.validate().is_err());

        args.nbytes = 1;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_frame_delimiters_in_msg() {
        let mut args = Args::try_parse_from(["netthru", "--mode", "server"]).unwrap();
        args.msg = "a|b".to_string();
        assert!(args.validate().is_err());
        args.msg = "plain message".to_string();
        assert!(args.validate().is_ok());
    }
}
