//! Configuration for [`LambdaServer`].

use super::LambdaServer;
use crate::codec::{DEFAULT_MAX_ENVELOPE_LENGTH, clamp_envelope_length};

/// Tunables applied to every invocation served by a [`LambdaServer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Largest inbound envelope accepted, in bytes.
    pub max_envelope_bytes: usize,
    /// Decode bodies flagged `isBase64Encoded` before handing them to the
    /// handler. When `false` the encoded text is passed through unchanged.
    pub decode_base64_bodies: bool,
    /// Copy the proxy request's headers onto the canonical request.
    pub propagate_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_envelope_bytes: DEFAULT_MAX_ENVELOPE_LENGTH,
            decode_base64_bodies: true,
            propagate_headers: true,
        }
    }
}

impl LambdaServer {
    /// Replace the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = ServerConfig {
            max_envelope_bytes: clamp_envelope_length(config.max_envelope_bytes),
            ..config
        };
        self
    }

    /// Set the largest inbound envelope accepted, in bytes.
    ///
    /// The value is clamped to
    /// [`MIN_ENVELOPE_LENGTH`](crate::codec::MIN_ENVELOPE_LENGTH)..=[`MAX_ENVELOPE_LENGTH`](crate::codec::MAX_ENVELOPE_LENGTH).
    #[must_use]
    pub fn max_envelope_bytes(mut self, bytes: usize) -> Self {
        self.config.max_envelope_bytes = clamp_envelope_length(bytes);
        self
    }

    /// Choose whether base64-flagged bodies are decoded before dispatch.
    #[must_use]
    pub fn decode_base64_bodies(mut self, enabled: bool) -> Self {
        self.config.decode_base64_bodies = enabled;
        self
    }

    /// Choose whether proxy request headers reach the handler.
    #[must_use]
    pub fn propagate_headers(mut self, enabled: bool) -> Self {
        self.config.propagate_headers = enabled;
        self
    }

    /// The configuration this server applies.
    #[must_use]
    pub fn config(&self) -> &ServerConfig { &self.config }
}
