//! Errors raised by [`LambdaServer`](super::LambdaServer) operations.

use std::io;

use thiserror::Error;

/// Errors that stop the invocation loop.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading from the runtime's input stream failed.
    #[error("failed to read from the runtime: {0}")]
    Io(#[from] io::Error),
}
