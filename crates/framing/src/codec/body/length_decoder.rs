//! Decoder for bodies delimited by a `Content-Length` header, as defined in
//! [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use std::cmp;
use std::io::{self, Read};

use tracing::trace;

use crate::io::SessionInputBuffer;
use crate::protocol::ProtocolError;

/// Reads exactly `length` bytes and then reports completion.
///
/// Never reads past the declared length, so the bytes of the next message
/// stay in the session buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    length: u64,
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length, remaining: length }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Reads up to `min(dst.len(), remaining)` body bytes.
    ///
    /// Returns 0 once the body is complete.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Truncated`] (as `io::Error`) if the stream ends first.
    pub fn read<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, dst: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || dst.is_empty() {
            return Ok(0);
        }

        let max = usize::try_from(self.remaining).map_or(dst.len(), |remaining| cmp::min(remaining, dst.len()));
        let n = src.read(&mut dst[..max])?;
        if n == 0 {
            let received = self.length - self.remaining;
            return Err(ProtocolError::truncated(format!("{} bytes", self.length), received).into());
        }

        self.remaining -= n as u64;
        trace!(len = n, remaining = self.remaining, "read fixed length bytes");
        Ok(n)
    }
}
