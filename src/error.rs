//! Canonical error and result types for the crate.
//!
//! Every per-invocation failure is folded into [`TurnError`] at the turn
//! boundary and answered with a 500 envelope whose body is the error's
//! `Display` text. Only [`ServeError`] stops the invocation loop.

use thiserror::Error;

pub use crate::{
    codec::{DecodeError, EncodeError},
    panic::Fault,
    server::ServeError,
};

/// Error value returned explicitly by application handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A proxy request could not be turned into a canonical request.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The `httpMethod` field is not a valid method token.
    #[error("invalid HTTP method {method:?}: {source}")]
    InvalidMethod {
        method: String,
        #[source]
        source: http::method::InvalidMethod,
    },

    /// The reconstructed target is not a valid request URI.
    #[error("invalid request target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    /// The body was flagged as base64 but did not decode.
    #[error("invalid base64 body: {0}")]
    InvalidBody(#[from] base64::DecodeError),
}

/// Any failure that turns a single invocation into an error envelope.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The inbound envelope could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The proxy request could not be translated.
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// Translation or the handler panicked.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// The handler returned an error.
    #[error("{0}")]
    Handler(HandlerError),
}

impl TurnError {
    /// Short label naming the error category, used for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Translate(_) => "translate",
            Self::Fault(_) => "fault",
            Self::Handler(_) => "handler",
        }
    }
}

/// Canonical result alias used by the serving entry points.
pub type Result<T> = std::result::Result<T, ServeError>;
