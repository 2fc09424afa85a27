#![doc(html_root_url = "https://docs.rs/lambdaframe/latest")]
//! Public API for the `lambdaframe` library.
//!
//! This crate runs synchronous HTTP-style handlers inside a serverless
//! "custom runtime" that delivers one JSON envelope per invocation over
//! standard input and expects one JSON envelope back on standard output. It
//! provides the invocation loop, request translation, in-memory response
//! capture, and a path-pattern router.
//!
//! ```no_run
//! use std::io::Write;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! lambdaframe::handle_fn("/foo", |_request, response| {
//!     response
//!         .headers_mut()
//!         .insert(http::header::CONTENT_TYPE, "text/html".parse()?);
//!     write!(response, "foo")?;
//!     Ok(())
//! })?;
//! lambdaframe::serve().await?;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod panic;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use envelope::{InvocationContext, InvocationEnvelope, OutputEnvelope, ProxyRequest};
/// Result type alias re-exported for convenience when serving.
pub use error::Result;
pub use error::{HandlerError, TurnError};
pub use handler::{Handler, ResponseWriter, handler_fn};
pub use request::{Request, invocation_context};
pub use response::CapturedResponse;
pub use router::{Router, RouterError, default_router, handle, handle_fn};
pub use server::{LambdaServer, ServeError, ServerConfig, serve};
