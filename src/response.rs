//! In-memory response capture and its conversion to an output envelope.
//!
//! There is no socket behind an invocation: [`CapturedResponse`] records the
//! status, header multimap and body a handler writes, and
//! [`CapturedResponse::into_output`] turns that record into the single
//! [`OutputEnvelope`] the runtime accepts.

use std::{collections::BTreeMap, io};

use bytes::BytesMut;
use http::{HeaderMap, StatusCode};

use crate::{envelope::OutputEnvelope, handler::ResponseWriter};

/// Response sink recording everything a handler writes.
///
/// The status starts at `200 OK`. Body writes are appended in call order and
/// buffered in full until the invocation completes.
#[derive(Debug)]
pub struct CapturedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Default for CapturedResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }
}

impl CapturedResponse {
    /// Construct an empty response with status 200.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Body bytes written so far.
    #[must_use]
    pub fn body(&self) -> &[u8] { &self.body }

    /// Convert the captured state into an output envelope.
    ///
    /// Only the first value recorded for each header name survives: the wire
    /// shape holds one value per name, so repeated headers such as multiple
    /// `Set-Cookie` lines are dropped rather than merged. Names are rendered
    /// in canonical form and the body is decoded as UTF-8, replacing invalid
    /// sequences.
    #[must_use]
    pub fn into_output(self) -> OutputEnvelope {
        let headers = self
            .headers
            .keys()
            .filter_map(|name| {
                let value = self.headers.get(name)?;
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                Some((canonical_header_name(name.as_str()), value))
            })
            .collect::<BTreeMap<_, _>>();

        OutputEnvelope {
            status_code: self.status.as_u16(),
            headers,
            body: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}

impl io::Write for CapturedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl ResponseWriter for CapturedResponse {
    fn status(&self) -> StatusCode { self.status }

    fn set_status(&mut self, status: StatusCode) { self.status = status; }

    fn headers(&self) -> &HeaderMap { &self.headers }

    fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
}

/// Render a header name in canonical MIME form.
///
/// The first letter and any letter following a hyphen are upper-cased, the
/// rest lower-cased.
///
/// ```
/// use lambdaframe::response::canonical_header_name;
///
/// assert_eq!(canonical_header_name("content-type"), "Content-Type");
/// assert_eq!(canonical_header_name("x-amz-CF-id"), "X-Amz-Cf-Id");
/// ```
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            mapped
        })
        .collect()
}
