//! Utilities for driving a [`LambdaServer`](lambdaframe::LambdaServer) with
//! in-memory streams during tests.
//!
//! These helpers feed raw runtime input to the invocation loop and return
//! the output envelopes it wrote, decoded for easy assertions.
//!
//! ```rust
//! use lambdaframe::{LambdaServer, Router};
//! use lambdaframe_testing::{drive_with_bytes, proxy_event};
//!
//! # async fn example() -> std::io::Result<()> {
//! let server = LambdaServer::new(Router::new());
//! let input = proxy_event("GET", "/missing", "");
//! let outputs = drive_with_bytes(&server, input.as_bytes()).await?;
//! assert_eq!(outputs[0].status_code, 404);
//! # Ok(())
//! # }
//! ```

pub mod drive;
pub mod events;
pub mod logging;

pub use drive::{drive_with_bytes, drive_with_chunks, parse_outputs};
pub use events::{proxy_event, proxy_event_json};
pub use logging::{LoggerHandle, logger};
