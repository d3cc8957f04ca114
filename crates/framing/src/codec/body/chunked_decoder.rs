//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes message bodies that use chunked transfer encoding
//! as specified in [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1).
//!
//! The chunked encoding allows the sender to transmit message data in a series of chunks,
//! indicating the size of each chunk before its data.

use std::cmp;
use std::io::{self, Read};

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::trace;
use ChunkedState::*;

use crate::buffer::ByteBuffer;
use crate::config::DEFAULT_MAX_HEADER_COUNT;
use crate::ensure;
use crate::io::SessionInputBuffer;
use crate::protocol::ProtocolError;

/// A decoder for handling HTTP chunked transfer encoding.
///
/// The decoder processes the body according to the chunked format:
/// - Each chunk starts with its size in hexadecimal
/// - Followed by optional extensions and CRLF
/// - Then the chunk data and CRLF
/// - A zero-sized chunk ends the data, followed by optional trailer fields
///   and an empty line
///
/// Extensions are skipped. Trailer fields are kept and available from
/// [`trailers`](Self::trailers) once the body is complete.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining: u64,
    received: u64,
    line: ByteBuffer,
    trailer_block: ByteBuffer,
    trailer_count: usize,
    trailers: HeaderMap,
    max_header_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size line
    Size,
    /// Read chunk data
    Data,
    /// Read the CRLF after chunk data
    DataCrlf,
    /// Read trailer fields up to the final empty line
    Trailers,
    /// Final state after the last chunk and its trailers
    End,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    /// Creates a new decoder, ready to read the size of the first chunk.
    pub fn new() -> Self {
        Self::with_max_header_count(DEFAULT_MAX_HEADER_COUNT)
    }

    pub fn with_max_header_count(max_header_count: usize) -> Self {
        Self {
            state: Size,
            remaining: 0,
            received: 0,
            line: ByteBuffer::with_capacity(32),
            trailer_block: ByteBuffer::new(),
            trailer_count: 0,
            trailers: HeaderMap::new(),
            max_header_count,
        }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.state == End
    }

    /// Trailer fields of the body; empty until the body is complete.
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    pub fn take_trailers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.trailers)
    }

    /// Reads decoded body bytes into `dst`.
    ///
    /// Returns 0 once the terminating chunk and the trailer section have been
    /// consumed; nothing after them is read from `src`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::InvalidChunk`] for malformed framing,
    /// [`ProtocolError::Truncated`] if the stream ends inside the body, both
    /// carried as `io::Error` of kind `InvalidData`.
    pub fn read<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }

        loop {
            match self.state {
                End => return Ok(0),
                Data => return self.read_data(src, dst),
                _ => self.state = self.step(src)?,
            }
        }
    }

    /// Processes one framing line and returns the next state.
    fn step<R: Read>(&mut self, src: &mut SessionInputBuffer<R>) -> io::Result<ChunkedState> {
        match self.state {
            Size => self.read_size(src),
            DataCrlf => self.read_data_crlf(src),
            Trailers => self.read_trailer(src),
            Data | End => Ok(self.state),
        }
    }

    fn next_line<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, expected: &str) -> io::Result<()> {
        self.line.clear();
        if src.read_line(&mut self.line)?.is_none() {
            return Err(ProtocolError::truncated(expected, self.received).into());
        }
        Ok(())
    }

    /// Parses `<hex>[ ][;extension]`.
    fn read_size<R: Read>(&mut self, src: &mut SessionInputBuffer<R>) -> io::Result<ChunkedState> {
        self.next_line(src, "chunk size line")?;

        let end = self.line.index_of(b';', 0, self.line.len()).unwrap_or(self.line.len());
        let digits = self.line.trimmed(0, end).map_err(io::Error::other)?;
        let size = parse_chunk_size(digits).ok_or_else(|| {
            ProtocolError::invalid_chunk(format!(
                "invalid chunk size line: {:?}",
                String::from_utf8_lossy(self.line.as_slice())
            ))
        })?;

        trace!(size, "read chunk size");
        if size == 0 {
            return Ok(Trailers);
        }
        self.remaining = size;
        Ok(Data)
    }

    fn read_data<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, dst: &mut [u8]) -> io::Result<usize> {
        let max = usize::try_from(self.remaining).map_or(dst.len(), |remaining| cmp::min(remaining, dst.len()));
        let n = src.read(&mut dst[..max])?;
        if n == 0 {
            return Err(ProtocolError::truncated("chunk data", self.received).into());
        }

        self.remaining -= n as u64;
        self.received += n as u64;
        if self.remaining == 0 {
            self.state = DataCrlf;
        }
        trace!(len = n, "read chunked bytes");
        Ok(n)
    }

    fn read_data_crlf<R: Read>(&mut self, src: &mut SessionInputBuffer<R>) -> io::Result<ChunkedState> {
        self.next_line(src, "CRLF after chunk data")?;
        ensure!(self.line.is_empty(), ProtocolError::invalid_chunk("missing CRLF after chunk data").into());
        Ok(Size)
    }

    /// Collects one trailer line; the empty line ends the section.
    fn read_trailer<R: Read>(&mut self, src: &mut SessionInputBuffer<R>) -> io::Result<ChunkedState> {
        self.next_line(src, "end of trailer section")?;

        if !self.line.is_empty() {
            self.trailer_count += 1;
            ensure!(
                self.trailer_count <= self.max_header_count,
                ProtocolError::too_many_headers(self.max_header_count).into()
            );
            self.trailer_block.append_slice(self.line.as_slice());
            self.trailer_block.append_slice(b"\r\n");
            return Ok(Trailers);
        }

        if self.trailer_count > 0 {
            self.trailer_block.append_slice(b"\r\n");
            self.trailers = parse_trailers(self.trailer_block.as_slice(), self.trailer_count)?;
            self.trailer_block = ByteBuffer::new();
        }
        trace!(trailers = self.trailers.len(), "finished reading chunked data");
        Ok(End)
    }
}

/// Hex digits with overflow check; empty input is not a size.
fn parse_chunk_size(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u64, |size, b| {
        let digit = char::from(*b).to_digit(16)?;
        size.checked_mul(16)?.checked_add(u64::from(digit))
    })
}

fn parse_trailers(block: &[u8], count: usize) -> Result<HeaderMap, ProtocolError> {
    let mut parsed = vec![httparse::EMPTY_HEADER; count];
    let headers = match httparse::parse_headers(block, &mut parsed) {
        Ok(httparse::Status::Complete((_, headers))) => headers,
        Ok(httparse::Status::Partial) => return Err(ProtocolError::invalid_chunk("incomplete trailer section")),
        Err(e) => return Err(ProtocolError::invalid_chunk(format!("invalid trailer: {e}"))),
    };

    let mut trailers = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| ProtocolError::invalid_chunk(format!("invalid trailer name: {}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|_| ProtocolError::invalid_chunk(format!("invalid value for trailer {}", header.name)))?;
        trailers.append(name, value);
    }
    Ok(trailers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpError;

    fn decode_all(input: &[u8]) -> Result<(Vec<u8>, ChunkedDecoder), HttpError> {
        let mut src = SessionInputBuffer::new(input);
        let mut decoder = ChunkedDecoder::new();
        let mut body = Vec::new();
        let mut dst = [0u8; 7];
        loop {
            let n = decoder.read(&mut src, &mut dst)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&dst[..n]);
        }
        Ok((body, decoder))
    }

    #[test]
    fn test_basic() {
        let (body, decoder) = decode_all(b"10\r\n1234567890abcdef\r\n0\r\n\r\n").unwrap();
        assert_eq!(body, b"1234567890abcdef");
        assert!(decoder.is_completed());
        assert!(decoder.trailers().is_empty());
    }

    #[test]
    fn test_hello() {
        let (body, _) = decode_all(b"5\r\nhello\r\n0\r\n\r\n").unwrap();
        assert_eq!(body, b"hello");
    }

    #[test]
    fn test_multiple_chunks() {
        let (body, _) = decode_all(b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n").unwrap();
        assert_eq!(body, b"hello, world");
    }

    #[test]
    fn test_chunks_with_extensions() {
        let (body, _) = decode_all(b"5;chunk-ext=value\r\nhello\r\n3 ; name\r\nabc\r\n0;last\r\n\r\n").unwrap();
        assert_eq!(body, b"helloabc");
    }

    #[test]
    fn test_chunks_with_trailers() {
        let (body, mut decoder) =
            decode_all(b"5\r\nhello\r\n0\r\nExpires: never\r\nX-Checksum: abc\r\n\r\n").unwrap();
        assert_eq!(body, b"hello");
        assert_eq!(decoder.trailers().get("expires").unwrap(), "never");
        assert_eq!(decoder.trailers().get("x-checksum").unwrap(), "abc");

        let trailers = decoder.take_trailers();
        assert_eq!(trailers.len(), 2);
        assert!(decoder.trailers().is_empty());
    }

    #[test]
    fn stops_after_terminator() {
        let mut src = SessionInputBuffer::new(&b"3\r\nabc\r\n0\r\n\r\nGET / HTTP/1.1\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();
        let mut dst = [0u8; 16];

        assert_eq!(decoder.read(&mut src, &mut dst).unwrap(), 3);
        assert_eq!(decoder.read(&mut src, &mut dst).unwrap(), 0);
        assert_eq!(decoder.read(&mut src, &mut dst).unwrap(), 0);

        let mut next = ByteBuffer::new();
        src.read_line(&mut next).unwrap();
        assert_eq!(next.as_slice(), b"GET / HTTP/1.1");
    }

    #[test]
    fn test_incomplete_chunk() {
        let e = decode_all(b"5\r\nhel").unwrap_err();
        assert_eq!(e.as_protocol(), Some(&ProtocolError::truncated("chunk data", 3)));

        let e = decode_all(b"5\r\nhello\r\n").unwrap_err();
        assert!(matches!(e.as_protocol(), Some(ProtocolError::Truncated { .. })));

        let e = decode_all(b"5\r\nhello\r\n0\r\n").unwrap_err();
        assert!(matches!(e.as_protocol(), Some(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn test_invalid_chunk_size() {
        for input in [&b"xyz\r\n"[..], b"\r\n", b"-1\r\n", b"1 2\r\nab\r\n"] {
            let e = decode_all(input).unwrap_err();
            assert!(matches!(e.as_protocol(), Some(ProtocolError::InvalidChunk { .. })), "{input:?}");
        }
    }

    #[test]
    fn test_overflowing_chunk_size() {
        let e = decode_all(b"fffffffffffffffff\r\n").unwrap_err();
        assert!(matches!(e.as_protocol(), Some(ProtocolError::InvalidChunk { .. })));
    }

    #[test]
    fn test_missing_crlf() {
        let e = decode_all(b"5\r\nhelloBad\r\n0\r\n\r\n").unwrap_err();
        assert_eq!(e.as_protocol(), Some(&ProtocolError::invalid_chunk("missing CRLF after chunk data")));
    }

    #[test]
    fn test_too_many_trailers() {
        let mut src = SessionInputBuffer::new(&b"0\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::with_max_header_count(2);
        let e = decoder.read(&mut src, &mut [0u8; 4]).unwrap_err();
        assert_eq!(HttpError::from(e).as_protocol(), Some(&ProtocolError::too_many_headers(2)));
    }

    #[test]
    fn test_invalid_trailer() {
        let e = decode_all(b"0\r\nno colon here\r\n\r\n").unwrap_err();
        assert!(matches!(e.as_protocol(), Some(ProtocolError::InvalidChunk { .. })));
    }

    #[test]
    fn test_large_chunk() {
        let size = 1024 * 1024;
        let mut data = format!("{size:x}\r\n").into_bytes();
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let mut src = SessionInputBuffer::with_capacity(&data[..], 1024);
        let mut decoder = ChunkedDecoder::new();
        let mut body = Vec::new();
        decoder_read_to_end(&mut decoder, &mut src, &mut body);
        assert_eq!(body.len(), size);
        assert!(body.iter().all(|&b| b == b'A'));
    }

    #[test]
    fn test_small_buffer() {
        let input = b"a;ext=1\r\n0123456789\r\n2\r\nab\r\n0\r\nTrailer: yes\r\n\r\n";
        let mut src = SessionInputBuffer::with_capacity(&input[..], 3);
        let mut decoder = ChunkedDecoder::new();
        let mut body = Vec::new();
        decoder_read_to_end(&mut decoder, &mut src, &mut body);
        assert_eq!(body, b"0123456789ab");
        assert_eq!(decoder.trailers().get("trailer").unwrap(), "yes");
    }

    #[test]
    fn test_zero_size_chunk() {
        let (body, decoder) = decode_all(b"0\r\n\r\n").unwrap();
        assert!(body.is_empty());
        assert!(decoder.is_completed());
    }

    fn decoder_read_to_end(decoder: &mut ChunkedDecoder, src: &mut SessionInputBuffer<&[u8]>, body: &mut Vec<u8>) {
        let mut dst = [0u8; 4096];
        loop {
            let n = decoder.read(src, &mut dst).unwrap();
            if n == 0 {
                break;
            }
            body.extend_from_slice(&dst[..n]);
        }
    }
}
