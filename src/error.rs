use std::{io, string::FromUtf8Error};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Enum for client and provider errors
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required argument was missing or malformed; the remote side was
    /// never contacted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The remote path does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The share refused the operation for the current credentials
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// The remote path already exists (e.g. mkdir over an existing entry)
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Remote content could not be decoded (e.g. non-UTF-8 text)
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// Any transport-level failure surfaced by the provider
    #[error("transport: {0}")]
    Transport(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => Self::AccessDenied(err.to_string()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::Transport(err.to_string()),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}
