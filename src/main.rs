//! Demo binary serving an echo handler over the proxy runtime protocol.
//!
//! `/foo` answers with a fixed page; every other path echoes the request
//! target and body back as plain text.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use http::{HeaderValue, header::CONTENT_TYPE};
use lambdaframe::{LambdaServer, Router, RouterError};
use tracing_subscriber::EnvFilter;

fn routes() -> Result<Router, RouterError> {
    let router = Router::new();
    router.handle_fn("/foo", |_request, response| {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        write!(response, "This is /foo")?;
        Ok(())
    })?;
    router.handle_fn("/", |request, response| {
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        writeln!(response, "URL: {}", request.uri())?;
        writeln!(response, "Body: {}", String::from_utf8_lossy(request.body()))?;
        Ok(())
    })?;
    Ok(router)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Standard output is the protocol channel, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    let router = match routes() {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(error = %e, "failed to register routes");
            return ExitCode::FAILURE;
        }
    };

    let server = LambdaServer::new(router)
        .max_envelope_bytes(cli.max_envelope_bytes)
        .decode_base64_bodies(!cli.raw_base64_bodies)
        .propagate_headers(!cli.drop_request_headers);

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "invocation loop failed");
            ExitCode::FAILURE
        }
    }
}
