//! Metric helpers for `lambdaframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

/// Name of the counter tracking completed invocations.
pub const INVOCATIONS_TOTAL: &str = "lambdaframe_invocations_total";
/// Name of the counter tracking envelopes read and written.
pub const ENVELOPES_TOTAL: &str = "lambdaframe_envelopes_total";
/// Name of the counter tracking error occurrences, labelled by kind.
pub const ERRORS_TOTAL: &str = "lambdaframe_errors_total";

/// Direction of envelope processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Envelopes read from the runtime.
    Inbound,
    /// Envelopes written back to the runtime.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record one completed invocation, successful or not.
pub fn inc_invocations() {
    #[cfg(feature = "metrics")]
    metrics::counter!(INVOCATIONS_TOTAL).increment(1);
}

/// Record an envelope passing in the given direction.
pub fn inc_envelopes(direction: Direction) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ENVELOPES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record an error of the given kind (`decode`, `handler`, `encode`, ...).
pub fn inc_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
