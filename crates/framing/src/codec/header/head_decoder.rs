//! Message head decoder for HTTP requests and responses
//!
//! Reads the start line and header fields line by line from a
//! [`SessionInputBuffer`], then parses the assembled head with `httparse`.
//!
//! # Limits
//!
//! Both limits come from [`MessageConstraints`]:
//!
//! - Maximum length of a single head line (default 8KB)
//! - Maximum number of header fields (default 64)
//!
//! Only HTTP/1.0 and HTTP/1.1 heads are accepted.

use std::io::Read;

use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use httparse::Status;
use tracing::{error, trace};

use crate::buffer::ByteBuffer;
use crate::config::MessageConstraints;
use crate::ensure;
use crate::io::SessionInputBuffer;
use crate::protocol::{HttpError, ProtocolError, RequestHeader, ResponseHead};

/// Decoder for HTTP message heads.
///
/// Empty lines before the start line are skipped, as RFC 7230 section 3.5
/// asks of a robust reader.
#[derive(Debug)]
pub struct HeadDecoder {
    constraints: MessageConstraints,
    line: ByteBuffer,
    head: ByteBuffer,
}

impl Default for HeadDecoder {
    fn default() -> Self {
        Self::new(MessageConstraints::default())
    }
}

impl HeadDecoder {
    pub fn new(constraints: MessageConstraints) -> Self {
        Self { constraints, line: ByteBuffer::with_capacity(256), head: ByteBuffer::with_capacity(1024) }
    }

    pub fn constraints(&self) -> MessageConstraints {
        self.constraints
    }

    /// Reads the next request head.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before the first byte of
    /// a head, which is how a peer closes an idle persistent connection.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::InvalidHead`] for a malformed head or one cut short,
    /// [`ProtocolError::TooManyHeaders`] and [`ProtocolError::LineTooLong`]
    /// when the constraints are exceeded.
    pub fn decode_request<R: Read>(
        &mut self,
        input: &mut SessionInputBuffer<R>,
    ) -> Result<Option<RequestHeader>, HttpError> {
        let Some(header_count) = self.read_head(input)? else {
            return Ok(None);
        };

        let mut parsed = vec![httparse::EMPTY_HEADER; header_count];
        let mut req = httparse::Request::new(&mut parsed);
        let body_offset = complete(req.parse(self.head.as_slice()).map_err(|e| self.map_parse_error(e)))?;
        trace!(head_size = body_offset, "parsed request head");

        let method = req.method.ok_or_else(|| ProtocolError::invalid_head("missing method"))?;
        let path = req.path.ok_or_else(|| ProtocolError::invalid_head("missing request target"))?;

        let mut request = Request::new(());
        *request.method_mut() = Method::from_bytes(method.as_bytes())
            .map_err(|_| ProtocolError::invalid_head(format!("invalid method {method}")))?;
        *request.uri_mut() = path
            .parse::<Uri>()
            .map_err(|e| ProtocolError::invalid_head(format!("invalid request target {path}: {e}")))?;
        *request.version_mut() = to_version(req.version)?;
        *request.headers_mut() = to_header_map(req.headers)?;

        Ok(Some(RequestHeader::from(request)))
    }

    /// Reads the next response head; see [`decode_request`](Self::decode_request).
    pub fn decode_response<R: Read>(
        &mut self,
        input: &mut SessionInputBuffer<R>,
    ) -> Result<Option<ResponseHead>, HttpError> {
        let Some(header_count) = self.read_head(input)? else {
            return Ok(None);
        };

        let mut parsed = vec![httparse::EMPTY_HEADER; header_count];
        let mut resp = httparse::Response::new(&mut parsed);
        let body_offset = complete(resp.parse(self.head.as_slice()).map_err(|e| self.map_parse_error(e)))?;
        trace!(head_size = body_offset, "parsed response head");

        let code = resp.code.ok_or_else(|| ProtocolError::invalid_head("missing status code"))?;

        let mut response = Response::new(());
        *response.status_mut() =
            StatusCode::from_u16(code).map_err(|_| ProtocolError::invalid_head(format!("invalid status code {code}")))?;
        *response.version_mut() = to_version(resp.version)?;
        *response.headers_mut() = to_header_map(resp.headers)?;

        Ok(Some(response))
    }

    /// Assembles the head into `self.head` with CRLF line ends and returns
    /// the number of header fields, or `None` on a clean end of stream.
    fn read_head<R: Read>(&mut self, input: &mut SessionInputBuffer<R>) -> Result<Option<usize>, HttpError> {
        self.head.clear();
        let mut started = false;
        let mut header_count = 0;

        loop {
            self.line.clear();
            if input.read_line(&mut self.line)?.is_none() {
                if started {
                    return Err(ProtocolError::invalid_head("connection closed inside message head").into());
                }
                return Ok(None);
            }

            if self.line.is_empty() {
                if !started {
                    continue;
                }
                self.head.append_slice(b"\r\n");
                return Ok(Some(header_count));
            }

            if started {
                header_count += 1;
                ensure!(
                    header_count <= self.constraints.max_header_count,
                    ProtocolError::too_many_headers(self.constraints.max_header_count).into()
                );
            }
            started = true;
            self.head.append_slice(self.line.as_slice());
            self.head.append_slice(b"\r\n");
        }
    }

    fn map_parse_error(&self, e: httparse::Error) -> ProtocolError {
        match e {
            httparse::Error::TooManyHeaders => ProtocolError::too_many_headers(self.constraints.max_header_count),
            e => ProtocolError::invalid_head(e),
        }
    }
}

fn complete(status: Result<Status<usize>, ProtocolError>) -> Result<usize, ProtocolError> {
    match status? {
        Status::Complete(body_offset) => Ok(body_offset),
        Status::Partial => Err(ProtocolError::invalid_head("incomplete message head")),
    }
}

fn to_version(version: Option<u8>) -> Result<Version, ProtocolError> {
    match version {
        Some(0) => Ok(Version::HTTP_10),
        Some(1) => Ok(Version::HTTP_11),
        v => {
            error!(http_version = ?v, "unsupported http version");
            Err(ProtocolError::invalid_head(format!("unsupported http version {v:?}")))
        }
    }
}

fn to_header_map(headers: &[httparse::Header<'_>]) -> Result<HeaderMap, ProtocolError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| ProtocolError::invalid_head(format!("invalid header name {}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|_| ProtocolError::invalid_head(format!("invalid value for header {}", header.name)))?;
        map.append(name, value);
    }
    Ok(map)
}
