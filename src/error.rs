//! Error types of the application shell.
//!
//! The scheduler itself never fails a command; these cover the I/O around it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The JSON-lines event log could not be opened
    #[error("Failed to open event log {path}: {source}")]
    EventLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP listener could not bind
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Command line values that cannot form a schedule
    #[error("Invalid configuration: {0}")]
    Config(String),
}
