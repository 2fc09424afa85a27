//! Command line interface for the `lambdaframe` demo binary.
//!
//! Every option falls back to an environment variable so the binary can be
//! configured from the function's environment without a wrapper script.

use clap::Parser;

/// Command line arguments for the `lambdaframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "lambdaframe",
    version,
    about = "Serve a demo echo handler over the serverless proxy runtime protocol"
)]
pub struct Cli {
    /// Largest inbound envelope accepted, in bytes.
    #[arg(long, env = "LAMBDAFRAME_MAX_ENVELOPE_BYTES", default_value_t = 6 * 1024 * 1024)]
    pub max_envelope_bytes: usize,

    /// Pass base64-flagged bodies to handlers without decoding them.
    #[arg(long, env = "LAMBDAFRAME_RAW_BASE64_BODIES")]
    pub raw_base64_bodies: bool,

    /// Do not copy proxy request headers onto handler requests.
    #[arg(long, env = "LAMBDAFRAME_DROP_REQUEST_HEADERS")]
    pub drop_request_headers: bool,
}
