use std::fmt;
use std::io::{self, Read};

use http::HeaderMap;
use tracing::trace;

use crate::codec::body::PayloadDecoder;
use crate::io::SessionInputBuffer;

const DRAIN_BUFFER_SIZE: usize = 4 * 1024;

/// The decoded body of a received message.
///
/// Holds the session input buffer for as long as it lives, so the next
/// message head can only be read once the body reader is gone.
pub struct EntityReader<'a, R> {
    input: &'a mut SessionInputBuffer<R>,
    decoder: PayloadDecoder,
}

impl<'a, R: Read> EntityReader<'a, R> {
    pub fn new(input: &'a mut SessionInputBuffer<R>, decoder: PayloadDecoder) -> Self {
        Self { input, decoder }
    }

    /// Whether the body has been read up to its framing end.
    pub fn is_completed(&self) -> bool {
        self.decoder.is_completed()
    }

    /// Trailer fields of a chunked body, complete once the body is.
    pub fn trailers(&self) -> Option<&HeaderMap> {
        self.decoder.trailers()
    }

    /// Reads and discards the rest of the body, returning how many bytes
    /// were skipped.
    pub fn drain(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; DRAIN_BUFFER_SIZE];
        let mut drained = 0;
        loop {
            match self.read(&mut buf)? {
                0 => break,
                n => drained += n as u64,
            }
        }
        trace!(drained, "drained entity");
        Ok(drained)
    }
}

impl<R: Read> Read for EntityReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.decoder.read(self.input, buf)
    }
}

impl<R> fmt::Debug for EntityReader<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityReader").field("decoder", &self.decoder).finish_non_exhaustive()
    }
}
