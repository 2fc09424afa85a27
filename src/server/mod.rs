//! The invocation loop bridging the runtime protocol to a [`Handler`].
//!
//! [`LambdaServer`] reads one envelope at a time, translates it into a
//! canonical request, runs the handler against a fresh
//! [`CapturedResponse`](crate::response::CapturedResponse) behind a panic
//! boundary, and writes exactly one output envelope back before reading the
//! next. Turns never overlap and outputs follow input order.

use std::{fmt, sync::Arc};

use crate::{handler::Handler, router::default_router};

mod config;
pub mod error;
mod runtime;
mod turn;


pub use config::ServerConfig;
pub use error::ServeError;
pub use runtime::serve;

/// Serves invocations from the runtime with a single handler.
///
/// ```no_run
/// use std::io::Write;
///
/// use lambdaframe::{router::Router, server::LambdaServer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let router = Router::new();
/// router.handle_fn("/hello", |_request, response| {
///     write!(response, "hello")?;
///     Ok(())
/// })?;
/// LambdaServer::new(router).run().await?;
/// # Ok(())
/// # }
/// ```
pub struct LambdaServer {
    handler: Arc<dyn Handler>,
    config: ServerConfig,
}

impl LambdaServer {
    /// Create a server dispatching every invocation to `handler`.
    #[must_use]
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            config: ServerConfig::default(),
        }
    }

    /// Create a server dispatching to the process-wide
    /// [`default_router`](crate::router::default_router).
    #[must_use]
    pub fn with_default_router() -> Self { Self::new(default_router()) }
}

impl fmt::Debug for LambdaServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
