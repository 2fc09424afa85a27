//! Translation from the gateway's proxy request to the canonical request.
//!
//! The canonical request is an [`http::Request`] whose target is rebuilt from
//! the proxy path and query parameters only. Scheme, host and forwarding
//! headers are not consulted, so the target is always origin-form and
//! relative to the deployment stage. Redirects built from it will miss the
//! stage segment when one is present in the public URL.
//!
//! The gateway delivers the path already percent-decoded. It is re-encoded
//! when the target is rebuilt, so characters such as a space or `?` stay in
//! the path instead of invalidating or splitting the target.
//!
//! Lambda metadata travels in the request extensions: the
//! [`InvocationContext`] and a [`ProxyMetadata`] record, each keyed by its
//! type.

use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, Uri};
use log::warn;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::form_urlencoded;

use crate::{
    envelope::{InvocationContext, InvocationEnvelope, ProxyRequest, RequestContext},
    error::TranslateError,
    server::ServerConfig,
};

/// Bytes escaped when a decoded path is placed back into a request target.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// The request shape handlers consume.
pub type Request = http::Request<Bytes>;

/// Gateway details of the proxied request that have no place in the
/// canonical request itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyMetadata {
    /// Resource pattern the gateway matched.
    pub resource: String,
    /// Request path exactly as the gateway sent it, percent-decoded.
    pub path: String,
    /// Parameters extracted by the resource pattern.
    pub path_parameters: BTreeMap<String, String>,
    /// Stage variables configured on the deployment.
    pub stage_variables: BTreeMap<String, String>,
    /// Gateway request metadata.
    pub request_context: RequestContext,
}

/// Fetch the invocation context attached to `request`.
#[must_use]
pub fn invocation_context(request: &Request) -> Option<&InvocationContext> {
    request.extensions().get::<InvocationContext>()
}

/// Fetch the gateway metadata attached to `request`.
#[must_use]
pub fn proxy_metadata(request: &Request) -> Option<&ProxyMetadata> {
    request.extensions().get::<ProxyMetadata>()
}

impl ProxyRequest {
    /// Rebuild the request target from the path and query parameters.
    ///
    /// The path is percent-encoded and given a leading `/` when it lacks
    /// one. Parameters are form-encoded in key order so the result is
    /// reproducible.
    ///
    /// ```
    /// use lambdaframe::envelope::ProxyRequest;
    ///
    /// let mut request = ProxyRequest::default();
    /// request.path = "/search".into();
    /// request.query_string_parameters.insert("q".into(), "a b".into());
    /// request.query_string_parameters.insert("page".into(), "2".into());
    /// assert_eq!(request.target(), "/search?page=2&q=a+b");
    ///
    /// request.path = "/hello world".into();
    /// request.query_string_parameters.clear();
    /// assert_eq!(request.target(), "/hello%20world");
    /// ```
    #[must_use]
    pub fn target(&self) -> String {
        let mut target = String::with_capacity(self.path.len() + 1);
        if !self.path.starts_with('/') {
            target.push('/');
        }
        target.extend(utf8_percent_encode(&self.path, PATH));
        if !self.query_string_parameters.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query_string_parameters)
                .finish();
            target.push('?');
            target.push_str(&query);
        }
        target
    }
}

/// Translate a decoded envelope into the canonical request.
///
/// # Errors
///
/// Returns a [`TranslateError`] if the method or rebuilt target is invalid,
/// or if a base64-flagged body does not decode while body decoding is
/// enabled.
pub fn translate(
    envelope: InvocationEnvelope,
    config: &ServerConfig,
) -> Result<Request, TranslateError> {
    let InvocationEnvelope {
        request: proxy,
        context,
    } = envelope;

    let method = Method::from_bytes(proxy.http_method.as_bytes()).map_err(|source| {
        TranslateError::InvalidMethod {
            method: proxy.http_method.clone(),
            source,
        }
    })?;
    let target = proxy.target();
    let uri = target
        .parse::<Uri>()
        .map_err(|source| TranslateError::InvalidTarget {
            target: target.clone(),
            source,
        })?;

    let ProxyRequest {
        resource,
        path,
        headers,
        path_parameters,
        stage_variables,
        request_context,
        body,
        is_base64_encoded,
        ..
    } = proxy;

    let body = if is_base64_encoded && config.decode_base64_bodies {
        Bytes::from(STANDARD.decode(body)?)
    } else {
        Bytes::from(body)
    };

    let mut request = Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    if config.propagate_headers {
        copy_headers(&headers, request.headers_mut());
    }
    request.extensions_mut().insert(context);
    request.extensions_mut().insert(ProxyMetadata {
        resource,
        path,
        path_parameters,
        stage_variables,
        request_context,
    });
    Ok(request)
}

fn copy_headers(source: &BTreeMap<String, String>, target: &mut http::HeaderMap) {
    for (name, value) in source {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                target.append(name, value);
            }
            _ => warn!("skipping header that is not valid HTTP: name={name:?}"),
        }
    }
}
