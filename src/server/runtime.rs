//! Runtime control for [`LambdaServer`].

use std::future::{Future, pending};

use log::{error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    signal,
};

use super::{LambdaServer, ServeError};
use crate::{
    channel::{Channel, StreamChannel},
    codec::EnvelopeCodec,
    metrics::{self, Direction},
};

impl LambdaServer {
    /// Serve invocations from standard input, answering on standard output,
    /// until the input ends or Ctrl+C is received.
    ///
    /// Standard output carries nothing but envelopes; logs belong on stderr.
    ///
    /// # Errors
    ///
    /// Returns a [`ServeError`] if reading standard input fails.
    pub async fn run(self) -> Result<(), ServeError> {
        self.serve_with_shutdown(tokio::io::stdin(), tokio::io::stdout(), async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("failed to listen for Ctrl+C; serving until input ends: error={e}");
                pending::<()>().await;
            }
        })
        .await
    }

    /// Serve invocations read from `reader`, writing envelopes to `writer`,
    /// until the input ends.
    ///
    /// # Errors
    ///
    /// Returns a [`ServeError`] if reading from `reader` fails.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ServeError>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        self.serve_with_shutdown(reader, writer, pending()).await
    }

    /// Serve invocations until the input ends or `shutdown` resolves.
    ///
    /// Shutdown is only observed while waiting for the next envelope; an
    /// invocation already in progress always completes and is written.
    ///
    /// # Errors
    ///
    /// Returns a [`ServeError`] if reading from `reader` fails.
    pub async fn serve_with_shutdown<R, W, S>(
        &self,
        reader: R,
        writer: W,
        shutdown: S,
    ) -> Result<(), ServeError>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
        S: Future<Output = ()> + Send,
    {
        let codec = EnvelopeCodec::new(self.config.max_envelope_bytes);
        let mut channel = StreamChannel::new(reader, writer, codec);
        self.serve_channel_with_shutdown(&mut channel, shutdown)
            .await
    }

    /// Serve invocations from `channel` until it reports end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`ServeError`] if the channel fails to receive.
    pub async fn serve_channel<C>(&self, channel: &mut C) -> Result<(), ServeError>
    where
        C: Channel + ?Sized,
    {
        self.serve_channel_with_shutdown(channel, pending()).await
    }

    /// Serve invocations from `channel` until end of input or `shutdown`.
    ///
    /// Every inbound item, including one that failed to decode, is answered
    /// with exactly one envelope. A failed write is logged and the loop moves
    /// on to the next invocation.
    ///
    /// # Errors
    ///
    /// Returns a [`ServeError`] if the channel fails to receive.
    pub async fn serve_channel_with_shutdown<C, S>(
        &self,
        channel: &mut C,
        shutdown: S,
    ) -> Result<(), ServeError>
    where
        C: Channel + ?Sized,
        S: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("shutdown requested; invocation loop stopping");
                    return Ok(());
                }
                next = channel.recv() => next?,
            };
            let Some(inbound) = next else {
                info!("input ended; invocation loop stopping");
                return Ok(());
            };

            let output = self.turn(inbound).await;
            match channel.send(output).await {
                Ok(()) => metrics::inc_envelopes(Direction::Outbound),
                Err(e) => {
                    metrics::inc_errors("encode");
                    error!("failed to write output envelope: error={e}");
                }
            }
        }
    }
}

/// Serve the process-wide [`default_router`](crate::router::default_router)
/// over standard input and output.
///
/// # Errors
///
/// Returns a [`ServeError`] if reading standard input fails.
pub async fn serve() -> Result<(), ServeError> { LambdaServer::with_default_router().run().await }
