//! Path-pattern router and the process-wide default router.
//!
//! Patterns follow the classic multiplexer rules: a pattern without a
//! trailing slash matches exactly that path, a pattern ending in `/` matches
//! its whole subtree, and the longest matching pattern wins. A request for
//! `/tree` is redirected to `/tree/` when only the subtree pattern exists.
//! Patterns are matched against the percent-decoded request path.
//!
//! Registration takes `&self` and is guarded by a lock, so a shared router
//! may gain routes while it is serving.

use std::{
    collections::BTreeMap,
    io::Write,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

use http::{
    HeaderValue,
    StatusCode,
    header::{CONTENT_TYPE, LOCATION, X_CONTENT_TYPE_OPTIONS},
};
use log::debug;
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::{
    error::HandlerError,
    handler::{Handler, HandlerFn, ResponseWriter, handler_fn},
    request::Request,
};

/// Errors raised while registering routes.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouterError {
    /// A handler was already registered for this pattern.
    #[error("pattern {0:?} was already registered")]
    DuplicatePattern(String),
    /// Patterns must be non-empty absolute paths.
    #[error("invalid pattern {0:?}: patterns must start with '/'")]
    InvalidPattern(String),
}

/// Handler answering `404 page not found`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn serve(
        &self,
        _request: &Request,
        response: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        plain_text_error(response, StatusCode::NOT_FOUND, "404 page not found")
    }
}

fn plain_text_error(
    response: &mut dyn ResponseWriter,
    status: StatusCode,
    message: &str,
) -> Result<(), HandlerError> {
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response.set_status(status);
    writeln!(response, "{message}")?;
    Ok(())
}

/// Registry mapping URL path patterns to handlers.
#[derive(Default)]
pub struct Router {
    routes: RwLock<BTreeMap<String, Arc<dyn Handler>>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("patterns", &self.patterns())
            .finish()
    }
}

impl Router {
    /// Construct an empty router.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register `handler` for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if `pattern` does not start
    /// with `/` and [`RouterError::DuplicatePattern`] if it is already taken.
    pub fn handle<H>(&self, pattern: &str, handler: H) -> Result<(), RouterError>
    where
        H: Handler + 'static,
    {
        if !pattern.starts_with('/') {
            return Err(RouterError::InvalidPattern(pattern.to_owned()));
        }
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        if routes.contains_key(pattern) {
            return Err(RouterError::DuplicatePattern(pattern.to_owned()));
        }
        routes.insert(pattern.to_owned(), Arc::new(handler));
        debug!("registered route: pattern={pattern}");
        Ok(())
    }

    /// Register a handler function for `pattern`.
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn handle_fn<F>(&self, pattern: &str, f: F) -> Result<(), RouterError>
    where
        F: Fn(&Request, &mut dyn ResponseWriter) -> Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.handle::<HandlerFn<F>>(pattern, handler_fn(f))
    }

    /// Registered patterns in lexicographic order.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Resolve the handler for `path`, or a redirect when only the subtree
    /// pattern for `path` is registered.
    fn resolve(&self, path: &str) -> Resolved {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        if !path.ends_with('/')
            && !routes.contains_key(path)
            && routes.contains_key(&format!("{path}/"))
        {
            return Resolved::Redirect;
        }
        routes
            .iter()
            .filter(|(pattern, _)| path_matches(pattern, path))
            .max_by_key(|(pattern, _)| pattern.len())
            .map_or(Resolved::NotFound, |(_, handler)| {
                Resolved::Handler(Arc::clone(handler))
            })
    }
}

enum Resolved {
    Handler(Arc<dyn Handler>),
    Redirect,
    NotFound,
}

fn path_matches(pattern: &str, path: &str) -> bool {
    if pattern.ends_with('/') {
        path.starts_with(pattern)
    } else {
        pattern == path
    }
}

impl Handler for Router {
    fn serve(
        &self,
        request: &Request,
        response: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        // The lock is released before the handler runs so handlers may
        // register further routes.
        let raw_path = request.uri().path();
        let path = percent_decode_str(raw_path).decode_utf8_lossy();
        match self.resolve(&path) {
            Resolved::Handler(handler) => handler.serve(request, response),
            Resolved::Redirect => {
                let mut location = format!("{raw_path}/");
                if let Some(query) = request.uri().query() {
                    location.push('?');
                    location.push_str(query);
                }
                response
                    .headers_mut()
                    .insert(LOCATION, HeaderValue::try_from(location)?);
                response.set_status(StatusCode::MOVED_PERMANENTLY);
                Ok(())
            }
            Resolved::NotFound => NotFound.serve(request, response),
        }
    }
}

static DEFAULT_ROUTER: LazyLock<Arc<Router>> = LazyLock::new(|| Arc::new(Router::new()));

/// The process-wide router used when a server is built without a handler.
///
/// Created on first use and never torn down.
#[must_use]
pub fn default_router() -> Arc<Router> { Arc::clone(&DEFAULT_ROUTER) }

/// Register `handler` for `pattern` on the [`default_router`].
///
/// # Errors
///
/// See [`Router::handle`].
pub fn handle<H>(pattern: &str, handler: H) -> Result<(), RouterError>
where
    H: Handler + 'static,
{
    DEFAULT_ROUTER.handle(pattern, handler)
}

/// Register a handler function for `pattern` on the [`default_router`].
///
/// # Errors
///
/// See [`Router::handle`].
pub fn handle_fn<F>(pattern: &str, f: F) -> Result<(), RouterError>
where
    F: Fn(&Request, &mut dyn ResponseWriter) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    DEFAULT_ROUTER.handle_fn(pattern, f)
}
