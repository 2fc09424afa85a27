//! A single invocation: translate, dispatch, capture, serialise.

use std::sync::Arc;

use log::{debug, error};

use super::{LambdaServer, ServerConfig};
use crate::{
    codec::Inbound,
    envelope::{InvocationEnvelope, OutputEnvelope},
    error::TurnError,
    handler::Handler,
    metrics::{self, Direction},
    panic::{Fault, catch_fault, format_panic},
    request::translate,
    response::CapturedResponse,
};

impl LambdaServer {
    /// Run one decoded invocation through the handler.
    ///
    /// The handler runs on Tokio's blocking pool and is awaited before this
    /// returns, so blocking work inside it does not stall the runtime.
    /// Translation and the handler execute behind a panic boundary.
    ///
    /// # Errors
    ///
    /// Returns a [`TurnError`] if translation fails, the handler returns an
    /// error, or either of them panics.
    pub async fn invoke(&self, envelope: InvocationEnvelope) -> Result<OutputEnvelope, TurnError> {
        let handler = Arc::clone(&self.handler);
        let config = self.config;
        let span = tracing::info_span!(
            "invocation",
            request_id = %envelope.context.aws_request_id,
            method = %envelope.request.http_method,
            path = %envelope.request.path,
        );

        let outcome = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            catch_fault(|| dispatch(handler.as_ref(), envelope, &config))
        })
        .await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(fault)) => Err(fault.into()),
            Err(join_error) if join_error.is_panic() => {
                let message = format_panic(join_error.into_panic()).to_string();
                Err(Fault::new(message, String::new()).into())
            }
            Err(join_error) => Err(Fault::new(join_error.to_string(), String::new()).into()),
        }
    }

    /// Resolve one inbound item into the envelope to write back.
    pub(super) async fn turn(&self, inbound: Inbound) -> OutputEnvelope {
        metrics::inc_envelopes(Direction::Inbound);
        let result = match inbound {
            Ok(envelope) => self.invoke(envelope).await,
            Err(decode_error) => Err(TurnError::Decode(decode_error)),
        };
        metrics::inc_invocations();

        match result {
            Ok(output) => {
                debug!("invocation completed: status={}", output.status_code);
                output
            }
            Err(turn_error) => {
                let kind = turn_error.kind();
                metrics::inc_errors(kind);
                error!("invocation failed: kind={kind}, error={turn_error}");
                OutputEnvelope::from_error(&turn_error)
            }
        }
    }
}

fn dispatch(
    handler: &dyn Handler,
    envelope: InvocationEnvelope,
    config: &ServerConfig,
) -> Result<OutputEnvelope, TurnError> {
    let request = translate(envelope, config)?;
    let mut response = CapturedResponse::new();
    handler
        .serve(&request, &mut response)
        .map_err(TurnError::Handler)?;
    Ok(response.into_output())
}
