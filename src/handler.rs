//! The synchronous handler abstraction served by the bridge.
//!
//! A [`Handler`] receives a canonical [`Request`] and writes its response
//! through a [`ResponseWriter`]: set the status, mutate headers, append body
//! bytes. Routers and middleware written against this trait run unchanged
//! behind [`LambdaServer`](crate::server::LambdaServer).

use std::{io, sync::Arc};

use http::{HeaderMap, StatusCode};

use crate::{error::HandlerError, request::Request};

/// Sink a handler writes its response into.
///
/// Body bytes are written through [`io::Write`], so `write!` works directly:
///
/// ```
/// use std::io::Write;
///
/// use lambdaframe::{handler::ResponseWriter, response::CapturedResponse};
///
/// let mut response = CapturedResponse::new();
/// response.set_status(http::StatusCode::CREATED);
/// write!(response, "id={}", 7).unwrap();
/// assert_eq!(response.body(), b"id=7");
/// ```
pub trait ResponseWriter: io::Write {
    /// Status recorded so far.
    fn status(&self) -> StatusCode;

    /// Record the response status. The last value set wins.
    fn set_status(&mut self, status: StatusCode);

    /// Headers recorded so far.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the header multimap.
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

/// Request handler invoked once per invocation.
pub trait Handler: Send + Sync {
    /// Serve `request`, writing the response into `response`.
    ///
    /// # Errors
    ///
    /// Returning an error discards whatever was written and answers the
    /// invocation with a 500 envelope carrying the error's message.
    fn serve(&self, request: &Request, response: &mut dyn ResponseWriter)
    -> Result<(), HandlerError>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(
        &self,
        request: &Request,
        response: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        (**self).serve(request, response)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve(
        &self,
        request: &Request,
        response: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        (**self).serve(request, response)
    }
}

/// Adapter turning a closure into a [`Handler`].
///
/// ```
/// use std::io::Write;
///
/// use lambdaframe::handler::handler_fn;
///
/// let hello = handler_fn(|_request, response| {
///     write!(response, "hello")?;
///     Ok(())
/// });
/// # let _ = hello;
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HandlerFn<F>(F);

/// Wrap `f` so it can be registered wherever a [`Handler`] is expected.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request, &mut dyn ResponseWriter) -> Result<(), HandlerError> + Send + Sync,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request, &mut dyn ResponseWriter) -> Result<(), HandlerError> + Send + Sync,
{
    fn serve(
        &self,
        request: &Request,
        response: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        (self.0)(request, response)
    }
}
