use std::io;

use thiserror::Error;

/// Everything that can go wrong while loading a grid.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("construction error: {0}")]
    Construction(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("loader worker stopped before replying")]
    WorkerGone,
}

/// Coarse error family, used as a log key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Construction,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Construction => "construction",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http { .. } | Error::Transport(_) => ErrorKind::Network,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Construction(_) => ErrorKind::Construction,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::WorkerGone => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Parse(value.to_string())
    }
}

impl From<ureq::Error> for Error {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::StatusCode(status) => Error::Http { status },
            other => Error::Transport(other.to_string()),
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Construction(value.to_string())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Construction(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
