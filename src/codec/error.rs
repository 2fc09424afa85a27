//! Error types for the envelope codec.
//!
//! Decoding failures are per-envelope: each one is reported as the payload of
//! a single turn and the stream keeps going. Encoding failures are reported to
//! the caller of the write, which logs them and moves on.

use std::io;

use thiserror::Error;

/// A single inbound envelope could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The envelope was not valid JSON or did not match the envelope shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The envelope exceeded the configured maximum size and was discarded.
    #[error("envelope exceeds max length: {size} > {max}")]
    Oversized {
        /// Bytes discarded, up to the end of the envelope or of the stream.
        size: usize,
        /// Maximum allowed envelope size.
        max: usize,
    },

    /// The input ended part-way through an envelope.
    #[error("unexpected end of input: {bytes_received} bytes of an incomplete envelope")]
    Truncated {
        /// Bytes of the partial envelope received before the stream ended.
        bytes_received: usize,
    },
}

/// An output envelope could not be written.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Serialising the envelope to JSON failed.
    #[error("serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
