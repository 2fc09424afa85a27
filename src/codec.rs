//! Framing codec for the runtime's JSON streams.
//!
//! The input stream carries concatenated JSON documents, optionally separated
//! by whitespace. [`EnvelopeCodec`] finds the extent of each top-level value
//! structurally (tracking nesting depth, strings and escapes) before handing
//! it to `serde_json`, so a malformed envelope is reported on its own and the
//! envelope after it still decodes. Output envelopes are written as one JSON
//! document per line.
//!
//! # Error Handling
//!
//! Per-envelope failures are yielded as items ([`Inbound`] is a `Result`)
//! rather than as stream errors, because `FramedRead` stops after the first
//! decoder error. Only transport failures surface as [`io::Error`].

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::envelope::{InvocationEnvelope, OutputEnvelope};

pub mod error;

pub use error::{DecodeError, EncodeError};

/// Minimum accepted envelope size limit in bytes.
pub const MIN_ENVELOPE_LENGTH: usize = 1024;

/// Maximum accepted envelope size limit in bytes (64 MiB).
pub const MAX_ENVELOPE_LENGTH: usize = 64 * 1024 * 1024;

/// Default envelope size limit (6 MiB, the platform's synchronous payload cap).
pub const DEFAULT_MAX_ENVELOPE_LENGTH: usize = 6 * 1024 * 1024;

pub(crate) fn clamp_envelope_length(value: usize) -> usize {
    value.clamp(MIN_ENVELOPE_LENGTH, MAX_ENVELOPE_LENGTH)
}

/// Outcome of decoding one inbound JSON value.
pub type Inbound = Result<InvocationEnvelope, DecodeError>;

/// Incremental scan state for the value at the front of the buffer.
#[derive(Clone, Copy, Debug, Default)]
struct Scanner {
    /// Bytes of the current value examined so far, relative to the buffer start.
    offset: usize,
    /// Bytes of the current value already dropped for exceeding the limit.
    discarded: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scanner {
    fn consumed(&self) -> usize { self.discarded + self.offset }

    fn is_discarding(&self) -> bool { self.discarded > 0 }

    /// Continue scanning `buf`, returning the end of the current value once
    /// it is complete.
    fn scan(&mut self, buf: &[u8]) -> Option<usize> {
        while let Some(&byte) = buf.get(self.offset) {
            if self.in_string {
                self.offset += 1;
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Some(self.offset);
                    }
                }
                continue;
            }

            // A bare scalar ends at the next separator or opening token.
            if self.depth == 0
                && self.consumed() > 0
                && (byte.is_ascii_whitespace() || matches!(byte, b'{' | b'[' | b'"'))
            {
                return Some(self.offset);
            }

            self.offset += 1;
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some(self.offset);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// True when the buffered remainder could still be a complete bare scalar.
    fn at_top_level(&self) -> bool { self.depth == 0 && !self.in_string }
}

/// Codec decoding [`InvocationEnvelope`]s and encoding [`OutputEnvelope`]s.
#[derive(Clone, Debug)]
pub struct EnvelopeCodec {
    max_envelope_length: usize,
    scanner: Scanner,
}

impl EnvelopeCodec {
    /// Construct a codec rejecting envelopes larger than `max_envelope_length`.
    ///
    /// The limit is clamped to
    /// [`MIN_ENVELOPE_LENGTH`]..=[`MAX_ENVELOPE_LENGTH`].
    #[must_use]
    pub fn new(max_envelope_length: usize) -> Self {
        Self {
            max_envelope_length: clamp_envelope_length(max_envelope_length),
            scanner: Scanner::default(),
        }
    }

    /// Return the maximum envelope length accepted by this codec.
    #[must_use]
    pub fn max_envelope_length(&self) -> usize { self.max_envelope_length }

    fn take_value(&mut self, src: &mut BytesMut, end: usize) -> Inbound {
        let size = self.scanner.discarded + end;
        let value = src.split_to(end);
        self.scanner = Scanner::default();
        if size > self.max_envelope_length {
            return Err(DecodeError::Oversized {
                size,
                max: self.max_envelope_length,
            });
        }
        serde_json::from_slice(&value).map_err(DecodeError::from)
    }

    fn discard_scanned(&mut self, src: &mut BytesMut) {
        let scanned = self.scanner.offset;
        src.advance(scanned);
        self.scanner.discarded += scanned;
        self.scanner.offset = 0;
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self { Self::new(DEFAULT_MAX_ENVELOPE_LENGTH) }
}

fn skip_whitespace(src: &mut BytesMut) {
    let leading = src.iter().take_while(|b| b.is_ascii_whitespace()).count();
    src.advance(leading);
}

impl Decoder for EnvelopeCodec {
    type Item = Inbound;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.scanner.consumed() == 0 {
            skip_whitespace(src);
        }
        if src.is_empty() {
            return Ok(None);
        }

        if let Some(end) = self.scanner.scan(src) {
            return Ok(Some(self.take_value(src, end)));
        }
        if self.scanner.consumed() > self.max_envelope_length {
            self.discard_scanned(src);
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        // Clean end of input at an envelope boundary.
        if src.is_empty() && !self.scanner.is_discarding() {
            return Ok(None);
        }

        let scanner = std::mem::take(&mut self.scanner);
        let remainder = src.split();
        if scanner.is_discarding() {
            return Ok(Some(Err(DecodeError::Oversized {
                size: scanner.discarded + remainder.len(),
                max: self.max_envelope_length,
            })));
        }
        if scanner.at_top_level() {
            return Ok(Some(
                serde_json::from_slice(&remainder).map_err(DecodeError::from),
            ));
        }

        tracing::debug!(
            bytes_received = remainder.len(),
            depth = scanner.depth,
            "input ended inside an envelope"
        );
        Ok(Some(Err(DecodeError::Truncated {
            bytes_received: remainder.len(),
        })))
    }
}

impl Encoder<OutputEnvelope> for EnvelopeCodec {
    type Error = EncodeError;

    fn encode(&mut self, item: OutputEnvelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}
