//! Buffered, line and block oriented reading over a blocking byte source.

use std::cmp;
use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::time::Duration;

use tracing::trace;

use crate::buffer::ByteBuffer;
use crate::config::{DEFAULT_BUFFER_SIZE, H1Config};
use crate::ensure;
use crate::io::{ReadTimeout, TransportMetrics};
use crate::protocol::ProtocolError;

/// `TcpStream` rejects a zero read timeout, so polls wait at least this long.
const MIN_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// Input side of a connection's session buffer.
///
/// Valid bytes live in `storage[read_pos..write_pos]`. Before every refill the
/// unread bytes are moved to the front ([`compact`](Self::compact)), so a
/// refill always reads into one contiguous free region and never asks the
/// source for more than the free space.
pub struct SessionInputBuffer<R> {
    reader: R,
    storage: Box<[u8]>,
    read_pos: usize,
    write_pos: usize,
    max_line_length: usize,
    metrics: TransportMetrics,
}

impl<R> fmt::Debug for SessionInputBuffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionInputBuffer")
            .field("capacity", &self.storage.len())
            .field("read_pos", &self.read_pos)
            .field("write_pos", &self.write_pos)
            .field("max_line_length", &self.max_line_length)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl<R: Read> SessionInputBuffer<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            storage: vec![0; capacity.max(1)].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
            max_line_length: usize::MAX,
            metrics: TransportMetrics::new(),
        }
    }

    pub fn from_config(reader: R, config: &H1Config) -> Self {
        Self::with_capacity(reader, config.buffer_size()).with_max_line_length(config.constraints().max_line_length)
    }

    #[must_use]
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Moves the unread bytes to the front of the storage.
    pub fn compact(&mut self) {
        if self.read_pos == 0 {
            return;
        }
        let len = self.write_pos - self.read_pos;
        if len > 0 {
            self.storage.copy_within(self.read_pos..self.write_pos, 0);
        }
        self.read_pos = 0;
        self.write_pos = len;
    }

    /// Reads once from the source into the free part of the storage.
    ///
    /// Returns the number of bytes added, `Some(0)` if the storage is already
    /// full, or `None` at end of stream.
    pub fn fill_buffer(&mut self) -> io::Result<Option<usize>> {
        self.compact();
        if self.write_pos == self.storage.len() {
            return Ok(Some(0));
        }

        loop {
            match self.reader.read(&mut self.storage[self.write_pos..]) {
                Ok(0) => {
                    trace!("session input reached end of stream");
                    return Ok(None);
                }
                Ok(n) => {
                    self.write_pos += n;
                    self.metrics.increment_bytes_transferred(n as u64);
                    trace!(len = n, "filled session input buffer");
                    return Ok(Some(n));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Reads buffered bytes into `dst`, refilling once only when the buffer is
    /// empty.
    ///
    /// `Ok(0)` for a non-empty `dst` means end of stream.
    pub fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        if !self.has_buffered_data() && self.fill_buffer()?.is_none() {
            return Ok(0);
        }

        let n = cmp::min(dst.len(), self.length());
        dst[..n].copy_from_slice(&self.storage[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        Ok(n)
    }

    /// Appends the next line to `line`, without its LF and a preceding CR.
    ///
    /// Returns the number of bytes consumed from the stream including the
    /// terminator, or `None` if the stream ended before any byte of the line.
    /// A final line without terminator is returned as is.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::LineTooLong`] (as `io::Error`) when the line exceeds
    /// the configured maximum; transport errors as they come.
    pub fn read_line(&mut self, line: &mut ByteBuffer) -> io::Result<Option<usize>> {
        let mut consumed = 0;

        loop {
            if !self.has_buffered_data() && self.fill_buffer()?.is_none() {
                return Ok((consumed > 0).then_some(consumed));
            }

            let buffered = &self.storage[self.read_pos..self.write_pos];
            match buffered.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    line.append_slice(&buffered[..pos]);
                    self.read_pos += pos + 1;
                    consumed += pos + 1;

                    // the CR of a CRLF may have arrived in an earlier refill
                    let mut content_len = consumed - 1;
                    if content_len > 0 && line.as_slice().last() == Some(&b'\r') {
                        line.set_length(line.len() - 1).map_err(io::Error::other)?;
                        content_len -= 1;
                    }
                    ensure!(
                        content_len <= self.max_line_length,
                        ProtocolError::line_too_long(self.max_line_length).into()
                    );
                    return Ok(Some(consumed));
                }
                None => {
                    let len = buffered.len();
                    if consumed + len > self.max_line_length.saturating_add(1) {
                        return Err(ProtocolError::line_too_long(self.max_line_length).into());
                    }
                    line.append_slice(buffered);
                    self.read_pos = self.write_pos;
                    consumed += len;
                }
            }
        }
    }

    /// Drops all buffered bytes. Metrics are kept.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    #[inline]
    pub fn has_buffered_data(&self) -> bool {
        self.read_pos < self.write_pos
    }

    /// Number of buffered, unread bytes.
    #[inline]
    pub fn length(&self) -> usize {
        self.write_pos - self.read_pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Free space left for the next refill.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity() - self.length()
    }

    pub fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut TransportMetrics {
        &mut self.metrics
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + ReadTimeout> SessionInputBuffer<R> {
    /// Like [`fill_buffer`](Self::fill_buffer), but waits at most `timeout`.
    ///
    /// The source's previous timeout is restored afterwards. A timeout
    /// surfaces as `WouldBlock` or `TimedOut`, depending on the platform.
    pub fn fill_buffer_with_timeout(&mut self, timeout: Duration) -> io::Result<Option<usize>> {
        let previous = self.reader.read_timeout()?;
        self.reader.set_read_timeout(Some(cmp::max(timeout, MIN_POLL_TIMEOUT)))?;
        let result = self.fill_buffer();
        self.reader.set_read_timeout(previous)?;
        result
    }

    /// Returns whether a read would find data, blocking at most `timeout`.
    ///
    /// Bytes pulled in by the poll stay buffered for the next real read.
    pub fn is_data_available(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.has_buffered_data() {
            return Ok(true);
        }

        match self.fill_buffer_with_timeout(timeout) {
            Ok(_) => Ok(self.has_buffered_data()),
            Err(e) if is_timeout(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl<R: Read> Read for SessionInputBuffer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        SessionInputBuffer::read(self, buf)
    }
}
