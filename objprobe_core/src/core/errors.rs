use std::path::PathBuf;

use thiserror::Error;

use super::console::ConsoleError;

/// Failures reading or writing the profile store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unable to locate config dir")]
    NoConfigDir,
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file exists but is not a JSON list of profiles.
    #[error("Connection store {} is corrupt: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Parse { .. })
    }
}

/// Errors raised by a storage-service client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("{0}")]
    Request(String),
}

/// The central error enum for everything the command loop dispatches.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Connections are empty.")]
    EmptyStore,
    #[error("No connection is currently selected.")]
    NoActiveSession,
    #[error("Selection {0} is not in the list.")]
    InvalidSelection(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
    #[error("Console error: {0}")]
    Console(#[from] ConsoleError),
    #[error("Probe task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;
