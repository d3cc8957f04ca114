//! Buffered writing over a blocking byte sink.

use std::fmt;
use std::io::{self, Write};

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::buffer::ByteBuffer;
use crate::config::{DEFAULT_BUFFER_SIZE, DEFAULT_FRAGMENT_SIZE_HINT, H1Config};
use crate::io::TransportMetrics;

const CRLF: &[u8] = b"\r\n";

/// Output side of a connection's session buffer.
///
/// Small writes are collected in a [`ByteBuffer`]; writes of at least
/// `fragment_size_hint` bytes go straight to the sink once the pending bytes
/// are out, which keeps the byte order intact.
pub struct SessionOutputBuffer<W> {
    writer: W,
    buffer: ByteBuffer,
    capacity: usize,
    fragment_size_hint: usize,
    metrics: TransportMetrics,
}

impl<W> fmt::Debug for SessionOutputBuffer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOutputBuffer")
            .field("pending", &self.buffer.len())
            .field("capacity", &self.capacity)
            .field("fragment_size_hint", &self.fragment_size_hint)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl<W: Write> SessionOutputBuffer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, DEFAULT_BUFFER_SIZE).with_fragment_size_hint(DEFAULT_FRAGMENT_SIZE_HINT)
    }

    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            writer,
            buffer: ByteBuffer::with_capacity(capacity),
            capacity,
            fragment_size_hint: capacity,
            metrics: TransportMetrics::new(),
        }
    }

    pub fn from_config(writer: W, config: &H1Config) -> Self {
        Self::with_capacity(writer, config.buffer_size()).with_fragment_size_hint(config.fragment_size_hint())
    }

    #[must_use]
    pub fn with_fragment_size_hint(mut self, fragment_size_hint: usize) -> Self {
        self.fragment_size_hint = fragment_size_hint;
        self
    }

    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        if data.len() >= self.fragment_size_hint {
            self.flush_buffer()?;
            return self.write_to_sink(data);
        }

        if data.len() > self.capacity.saturating_sub(self.buffer.len()) {
            self.flush_buffer()?;
        }
        self.buffer.append_slice(data);
        Ok(())
    }

    /// Writes `data` followed by CRLF.
    pub fn write_line(&mut self, data: &[u8]) -> io::Result<()> {
        self.write(data)?;
        self.write(CRLF)
    }

    /// Runs `encoder` directly into the pending bytes.
    ///
    /// # Errors
    ///
    /// Whatever the encoder reports, plus transport errors if the pending
    /// bytes had to be written out.
    pub fn encode<I, E>(&mut self, encoder: &mut E, item: I) -> Result<(), E::Error>
    where
        E: Encoder<I>,
    {
        encoder.encode(item, self.buffer.as_bytes_mut())?;
        if self.buffer.len() >= self.capacity {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Pending bytes, for encoders that emit outside [`encode`](Self::encode).
    pub(crate) fn pending_mut(&mut self) -> &mut BytesMut {
        self.buffer.as_bytes_mut()
    }

    /// Hands all pending bytes to the sink and flushes it.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        self.writer.flush()
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.writer.write_all(self.buffer.as_slice())?;
        self.metrics.increment_bytes_transferred(self.buffer.len() as u64);
        trace!(len = self.buffer.len(), "flushed session output buffer");
        self.buffer.clear();
        Ok(())
    }

    fn write_to_sink(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.metrics.increment_bytes_transferred(data.len() as u64);
        Ok(())
    }

    /// Number of bytes waiting to be written.
    #[inline]
    pub fn length(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.buffer.len())
    }

    pub fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut TransportMetrics {
        &mut self.metrics
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Returns the sink. Bytes not flushed yet are discarded.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for SessionOutputBuffer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SessionOutputBuffer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        SessionOutputBuffer::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio_util::codec::BytesCodec;

    #[test]
    fn small_writes_wait_for_flush() {
        let mut output = SessionOutputBuffer::with_capacity(Vec::new(), 16);
        output.write(b"GET / ").unwrap();
        output.write_line(b"HTTP/1.1").unwrap();

        assert!(output.get_ref().is_empty());
        assert_eq!(output.length(), 16);

        output.flush().unwrap();
        assert_eq!(output.get_ref().as_slice(), b"GET / HTTP/1.1\r\n");
        assert_eq!(output.metrics().bytes_transferred(), 16);
        assert_eq!(output.length(), 0);
    }

    #[test]
    fn large_write_bypasses_buffer_in_order() {
        let mut output = SessionOutputBuffer::with_capacity(Vec::new(), 8).with_fragment_size_hint(4);
        output.write(b"ab").unwrap();
        output.write(b"0123456789").unwrap();

        assert_eq!(output.get_ref().as_slice(), b"ab0123456789");
        assert_eq!(output.length(), 0);
    }

    #[test]
    fn full_buffer_spills_before_append() {
        let mut output = SessionOutputBuffer::with_capacity(Vec::new(), 4).with_fragment_size_hint(usize::MAX);
        output.write(b"abc").unwrap();
        output.write(b"de").unwrap();

        assert_eq!(output.get_ref().as_slice(), b"abc");
        assert_eq!(output.length(), 2);
    }

    #[test]
    fn encode_writes_into_pending_bytes() {
        let mut output = SessionOutputBuffer::with_capacity(Vec::new(), 64);
        output.encode(&mut BytesCodec::new(), Bytes::from_static(b"hello")).unwrap();
        assert_eq!(output.length(), 5);

        output.flush().unwrap();
        assert_eq!(output.get_ref().as_slice(), b"hello");
    }
}
