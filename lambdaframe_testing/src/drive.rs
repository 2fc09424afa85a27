//! In-memory driving helpers.

use std::io;

use lambdaframe::{LambdaServer, OutputEnvelope};
use serde_json::Deserializer;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex, split};

/// Serve every envelope in `input` and return the decoded output envelopes.
///
/// The loop runs until `input` is exhausted, exactly as it would when the
/// runtime closes standard input.
///
/// # Errors
///
/// Returns an error if the invocation loop fails. Loop failures are surfaced
/// as [`io::Error`]s beginning with `"serve failed"`.
pub async fn drive_with_bytes(
    server: &LambdaServer,
    input: &[u8],
) -> io::Result<Vec<OutputEnvelope>> {
    let mut output = Vec::new();
    server
        .serve(input, &mut output)
        .await
        .map_err(|e| io::Error::other(format!("serve failed: {e}")))?;
    Ok(parse_outputs(&output))
}

/// Serve `chunks` written one at a time over a duplex stream of `capacity`
/// bytes, returning the decoded output envelopes.
///
/// Small capacities force the loop to see envelopes split across reads.
///
/// # Errors
///
/// Returns an error if writing the chunks, reading the output, or the
/// invocation loop itself fails.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub async fn drive_with_chunks(
    server: &LambdaServer,
    chunks: &[&[u8]],
    capacity: usize,
) -> io::Result<Vec<OutputEnvelope>> {
    assert!(capacity > 0, "capacity must be greater than zero");
    let (client, server_end) = duplex(capacity);
    let (server_read, server_write) = split(server_end);
    let (mut client_read, mut client_write) = split(client);

    let serve_fut = async {
        server
            .serve(server_read, server_write)
            .await
            .map_err(|e| io::Error::other(format!("serve failed: {e}")))
    };
    let feed_fut = async {
        for chunk in chunks {
            client_write.write_all(chunk).await?;
        }
        client_write.shutdown().await
    };
    let collect_fut = async {
        let mut buf = Vec::new();
        client_read.read_to_end(&mut buf).await?;
        io::Result::Ok(buf)
    };

    let ((), (), buf) = tokio::try_join!(serve_fut, feed_fut, collect_fut)?;
    Ok(parse_outputs(&buf))
}

/// Decode the concatenated output envelopes written by the loop.
///
/// # Panics
///
/// Panics if `bytes` is not a sequence of output envelopes.
#[must_use]
pub fn parse_outputs(bytes: &[u8]) -> Vec<OutputEnvelope> {
    Deserializer::from_slice(bytes)
        .into_iter::<OutputEnvelope>()
        .collect::<Result<_, _>>()
        .expect("output is not a sequence of envelopes")
}
