//! Error types for the server

use puzzle_solver::CompileError;
use std::path::PathBuf;
use thiserror::Error;

/// Main server error type
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialised
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Thread pool creation failed
    #[error("Thread pool creation failed: {0}")]
    ThreadPool(String),

    /// Loader error
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from discovering, compiling, or watching solver sources
#[derive(Error, Debug)]
pub enum LoaderError {
    /// A source file failed to compile; nothing from it was merged
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The file watcher could not be created or attached
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Walking a collection directory failed
    #[error("Failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors from the streaming transport of one session
#[derive(Error, Debug)]
pub enum TransportError {
    /// The peer went away before sending input
    #[error("Transport closed before input was received")]
    Closed,

    /// The input message was not text
    #[error("Input is not valid UTF-8")]
    InvalidInput,

    /// Sending or receiving failed
    #[error("Transport error: {0}")]
    Io(String),

    /// An update could not be encoded
    #[error("Failed to encode update: {0}")]
    Encode(#[from] serde_json::Error),
}
