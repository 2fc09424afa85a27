#![cfg(feature = "metrics")]
//! Tests for `lambdaframe` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use lambdaframe::{
    InvocationEnvelope,
    LambdaServer,
    channel::MemoryChannel,
    codec::DecodeError,
    handler_fn,
    metrics::{Direction, ENVELOPES_TOTAL, ERRORS_TOTAL, INVOCATIONS_TOTAL},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Return the value of counter `name` carrying `label=value`, if recorded.
fn counter(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> Option<u64> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .find_map(|(key, _, _, value)| {
            let key = key.key();
            let labelled = label.is_none_or(|(k, v)| {
                key.labels().any(|l| l.key() == k && l.value() == v)
            });
            match value {
                DebugValue::Counter(count) if key.name() == name && labelled => Some(count),
                _ => None,
            }
        })
}

#[rstest]
#[case(Direction::Inbound, "inbound")]
#[case(Direction::Outbound, "outbound")]
fn envelope_metric_increments(#[case] direction: Direction, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        lambdaframe::metrics::inc_envelopes(direction);
    });

    assert_eq!(
        counter(&snapshotter, ENVELOPES_TOTAL, Some(("direction", label))),
        Some(1),
        "{label} envelope metric not recorded"
    );
}

#[test]
fn invocation_metric_increments() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        lambdaframe::metrics::inc_invocations();
        lambdaframe::metrics::inc_invocations();
    });

    assert_eq!(counter(&snapshotter, INVOCATIONS_TOTAL, None), Some(2));
}

#[test]
fn error_metric_is_labelled_by_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        lambdaframe::metrics::inc_errors("decode");
    });

    assert_eq!(
        counter(&snapshotter, ERRORS_TOTAL, Some(("kind", "decode"))),
        Some(1)
    );
    assert_eq!(
        counter(&snapshotter, ERRORS_TOTAL, Some(("kind", "handler"))),
        None
    );
}

fn envelope(path: &str) -> InvocationEnvelope {
    let mut envelope = InvocationEnvelope::default();
    envelope.request.http_method = "GET".into();
    envelope.request.path = path.into();
    envelope
}

#[test]
fn invocation_loop_records_each_failure_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let server = LambdaServer::new(handler_fn(|request, _response| {
        if request.uri().path() == "/panic" {
            panic!("handler exploded");
        }
        Ok(())
    }));
    let mut channel = MemoryChannel::new();
    channel.push_inbound(Err(DecodeError::Truncated { bytes_received: 5 }));
    channel.push(envelope("/panic"));
    channel.push(envelope("/ok"));
    channel.fail_next_writes(1);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime");
    metrics::with_local_recorder(&recorder, || {
        runtime
            .block_on(server.serve_channel(&mut channel))
            .expect("serve");
    });

    assert_eq!(channel.sent().len(), 2);
    for kind in ["decode", "fault", "encode"] {
        assert_eq!(
            counter(&snapshotter, ERRORS_TOTAL, Some(("kind", kind))),
            Some(1),
            "{kind} error not recorded"
        );
    }
    assert_eq!(
        counter(&snapshotter, ERRORS_TOTAL, Some(("kind", "handler"))),
        None
    );
    assert_eq!(counter(&snapshotter, INVOCATIONS_TOTAL, None), Some(3));
    assert_eq!(
        counter(&snapshotter, ENVELOPES_TOTAL, Some(("direction", "inbound"))),
        Some(3)
    );
    assert_eq!(
        counter(&snapshotter, ENVELOPES_TOTAL, Some(("direction", "outbound"))),
        Some(2)
    );
}
