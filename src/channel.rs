//! Bidirectional message channel between the runtime and the invocation loop.
//!
//! The loop only needs "read the next envelope" and "write one envelope".
//! [`StreamChannel`] provides both over any pair of async byte streams using
//! [`EnvelopeCodec`]; [`MemoryChannel`] provides them over in-memory queues
//! for tests.

use std::{collections::VecDeque, io};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::{
    codec::{EncodeError, EnvelopeCodec, Inbound},
    envelope::{InvocationEnvelope, OutputEnvelope},
};

/// Transport carrying envelopes to and from the invocation loop.
#[async_trait]
pub trait Channel: Send {
    /// Receive the next inbound item.
    ///
    /// Returns `Ok(None)` once the input has ended. Must be cancel-safe: the
    /// loop may drop the future while waiting for shutdown.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the underlying transport fails.
    async fn recv(&mut self) -> io::Result<Option<Inbound>>;

    /// Write one output envelope.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if serialisation or the write fails.
    async fn send(&mut self, envelope: OutputEnvelope) -> Result<(), EncodeError>;
}

/// [`Channel`] over an async reader and writer.
pub struct StreamChannel<R, W> {
    reader: FramedRead<R, EnvelopeCodec>,
    writer: FramedWrite<W, EnvelopeCodec>,
}

impl<R, W> StreamChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap `reader` and `writer` using `codec` for both directions.
    pub fn new(reader: R, writer: W, codec: EnvelopeCodec) -> Self {
        Self {
            reader: FramedRead::new(reader, codec.clone()),
            writer: FramedWrite::new(writer, codec),
        }
    }

    /// Consume the channel, returning the reader and writer.
    pub fn into_inner(self) -> (R, W) { (self.reader.into_inner(), self.writer.into_inner()) }
}

#[async_trait]
impl<R, W> Channel for StreamChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> io::Result<Option<Inbound>> { self.reader.next().await.transpose() }

    async fn send(&mut self, envelope: OutputEnvelope) -> Result<(), EncodeError> {
        self.writer.send(envelope).await
    }
}

/// [`Channel`] backed by in-memory queues.
///
/// ```
/// use lambdaframe::{channel::MemoryChannel, envelope::InvocationEnvelope};
///
/// let mut channel = MemoryChannel::new();
/// channel.push(InvocationEnvelope::default());
/// assert_eq!(channel.pending(), 1);
/// assert!(channel.sent().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MemoryChannel {
    inbound: VecDeque<Inbound>,
    sent: Vec<OutputEnvelope>,
    failing_writes: usize,
}

impl MemoryChannel {
    /// Construct an empty channel.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Queue a decoded envelope for the loop to receive.
    pub fn push(&mut self, envelope: InvocationEnvelope) { self.inbound.push_back(Ok(envelope)); }

    /// Queue an arbitrary inbound item, including decode failures.
    pub fn push_inbound(&mut self, item: Inbound) { self.inbound.push_back(item); }

    /// Make the next `count` writes fail with an I/O error.
    pub fn fail_next_writes(&mut self, count: usize) { self.failing_writes = count; }

    /// Number of inbound items not yet received.
    #[must_use]
    pub fn pending(&self) -> usize { self.inbound.len() }

    /// Envelopes written so far, in write order.
    #[must_use]
    pub fn sent(&self) -> &[OutputEnvelope] { &self.sent }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn recv(&mut self) -> io::Result<Option<Inbound>> { Ok(self.inbound.pop_front()) }

    async fn send(&mut self, envelope: OutputEnvelope) -> Result<(), EncodeError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed").into());
        }
        self.sent.push(envelope);
        Ok(())
    }
}
