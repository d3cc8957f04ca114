//! Message head encoder for HTTP requests and responses
//!
//! Serializes the start line and header fields as given. Framing headers are
//! not touched: the head must already announce the body it is followed by.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use http::{HeaderMap, Request, Response, Version};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{HttpError, ProtocolError, RequestHeader};

/// Initial buffer size reserved for a head
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP message heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadEncoder;

impl<T> Encoder<&Request<T>> for HeadEncoder {
    type Error = HttpError;

    fn encode(&mut self, request: &Request<T>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        let version = version_str(request.version())?;
        write!(FastWrite(dst), "{} {} {}\r\n", request.method(), request.uri(), version)?;
        write_headers(request.headers(), dst);
        Ok(())
    }
}

impl Encoder<&RequestHeader> for HeadEncoder {
    type Error = HttpError;

    fn encode(&mut self, header: &RequestHeader, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&Request<()>>::encode(self, header.as_ref(), dst)
    }
}

impl<T> Encoder<&Response<T>> for HeadEncoder {
    type Error = HttpError;

    fn encode(&mut self, response: &Response<T>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        let version = version_str(response.version())?;
        let status = response.status();
        write!(
            FastWrite(dst),
            "{} {} {}\r\n",
            version,
            status.as_str(),
            status.canonical_reason().unwrap_or_default()
        )?;
        write_headers(response.headers(), dst);
        Ok(())
    }
}

fn version_str(version: Version) -> Result<&'static str, ProtocolError> {
    match version {
        Version::HTTP_10 => Ok("HTTP/1.0"),
        Version::HTTP_11 => Ok("HTTP/1.1"),
        v => {
            error!(http_version = ?v, "unsupported http version");
            Err(ProtocolError::invalid_head(format!("unsupported http version {v:?}")))
        }
    }
}

fn write_headers(headers: &HeaderMap, dst: &mut BytesMut) {
    for (header_name, header_value) in headers {
        dst.put_slice(header_name.as_ref());
        dst.put_slice(b": ");
        dst.put_slice(header_value.as_ref());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
}

/// Writer for `write!` straight into a `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
