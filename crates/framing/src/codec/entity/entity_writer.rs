use std::fmt;
use std::io::{self, Write};

use http::HeaderMap;
use tracing::{trace, warn};

use crate::codec::body::PayloadEncoder;
use crate::io::SessionOutputBuffer;
use crate::protocol::{HttpError, PayloadItem};

/// Frames body bytes of an outgoing message into the session output buffer.
///
/// The body is only complete on the wire after [`finish`](Self::finish); a
/// writer dropped before that leaves the message unterminated.
pub struct EntityWriter<'a, W: Write> {
    output: &'a mut SessionOutputBuffer<W>,
    encoder: PayloadEncoder,
    finished: bool,
}

impl<'a, W: Write> EntityWriter<'a, W> {
    pub fn new(output: &'a mut SessionOutputBuffer<W>, encoder: PayloadEncoder) -> Self {
        Self { output, encoder, finished: false }
    }

    /// Frames `data` as the next part of the body.
    ///
    /// # Errors
    ///
    /// [`HttpError::LengthExceeded`] when `data` goes past the declared
    /// `Content-Length`; transport errors if the buffer had to be written out.
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), HttpError> {
        self.output.encode(&mut self.encoder, PayloadItem::Chunk(data))
    }

    /// Whether the framing has reached its end.
    pub fn is_completed(&self) -> bool {
        self.encoder.is_finish()
    }

    /// Ends the body and flushes the session output buffer.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Truncated`](crate::protocol::ProtocolError::Truncated)
    /// when fewer bytes than the declared `Content-Length` were written.
    pub fn finish(mut self) -> Result<(), HttpError> {
        self.finished = true;
        self.output.encode(&mut self.encoder, PayloadItem::<&[u8]>::Eof)?;
        self.output.flush()?;
        trace!("finished entity");
        Ok(())
    }

    /// Ends a chunked body with trailer fields. Other framings cannot carry
    /// trailers and drop them.
    pub fn finish_with_trailers(mut self, trailers: HeaderMap) -> Result<(), HttpError> {
        self.encoder.set_trailers(trailers);
        self.finish()
    }
}

impl<W: Write> Write for EntityWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_data(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush_cache(self.output.pending_mut())?;
        self.output.flush()
    }
}

impl<W: Write> Drop for EntityWriter<'_, W> {
    fn drop(&mut self) {
        if !self.finished && !self.encoder.is_finish() {
            warn!("entity writer dropped before the body was finished");
        }
    }
}

impl<W: Write> fmt::Debug for EntityWriter<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityWriter")
            .field("encoder", &self.encoder)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
