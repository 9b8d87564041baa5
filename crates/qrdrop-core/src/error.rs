//! Error types for qrdrop.
//!
//! This module provides a unified error type for the startup path of qrdrop.
//! Per-request problems (bad `Range` headers, client disconnects) never
//! surface here; they are handled inside the HTTP layer.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// A specialized `Result` type for qrdrop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for qrdrop.
#[derive(Error, Debug)]
pub enum Error {
    /// The file to share does not exist
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The path exists but is not a regular file
    #[error("not a regular file: {0}")]
    NotAFile(String),

    /// Cannot read file: permission denied
    #[error("cannot read file '{0}': permission denied")]
    PermissionDenied(String),

    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        /// Address we tried to bind
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Local network address could not be determined
    #[error("local address discovery failed: {0}")]
    AddressDiscovery(String),

    /// QR code could not be generated
    #[error("failed to generate QR code: {0}")]
    QrGeneration(String),

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns whether this error should stop the process at startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::NotAFile(_)
                | Self::PermissionDenied(_)
                | Self::BindFailed { .. }
        )
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::FileNotFound(_) => Some("Check the path passed to --file."),
            Self::NotAFile(_) => Some("Only single files can be shared; archive a folder first."),
            Self::BindFailed { source, .. } if source.kind() == io::ErrorKind::AddrInUse => {
                Some("Another process is using this port. Try a different --port.")
            }
            Self::BindFailed { .. } => Some("Try a different --port or --bind address."),
            Self::ConfigError(_) => Some("Fix or remove the configuration file to use defaults."),
            _ => None,
        }
    }

    /// Map an I/O error raised while opening `path` to the matching variant.
    #[must_use]
    pub fn from_open(path: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_string()),
            _ => Self::Io(err),
        }
    }
}
