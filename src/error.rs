use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connect(std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out waiting for data from peer")]
    RecvTimeout,

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// The OS error code behind a connect failure, when the OS supplied one.
    /// Used as the process exit code so scripts can distinguish e.g.
    /// ECONNREFUSED from EHOSTUNREACH.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            Error::Connect(e) | Error::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
