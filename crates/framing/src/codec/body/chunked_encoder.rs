use std::io::Write;
use std::mem;

use bytes::{Buf, BufMut, BytesMut};
use http::HeaderMap;
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::config::DEFAULT_CHUNK_SIZE_HINT;
use crate::protocol::{HttpError, PayloadItem};

/// Writes `<HEX>\r\n<data>\r\n` chunks.
///
/// Small writes are collected in a cache and leave as one chunk once they
/// reach `chunk_size_hint`. Empty writes never produce a chunk, since a zero
/// sized chunk ends the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    cache: BytesMut,
    chunk_size_hint: usize,
    trailers: HeaderMap,
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::with_chunk_size_hint(DEFAULT_CHUNK_SIZE_HINT)
    }

    pub fn with_chunk_size_hint(chunk_size_hint: usize) -> Self {
        Self { eof: false, cache: BytesMut::new(), chunk_size_hint, trailers: HeaderMap::new() }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Trailer fields written after the last chunk.
    pub fn set_trailers(&mut self, trailers: HeaderMap) {
        self.trailers = trailers;
    }

    /// Emits the cached bytes, if any, as one chunk.
    pub fn flush_cache(&mut self, dst: &mut BytesMut) -> Result<(), HttpError> {
        if self.cache.is_empty() {
            return Ok(());
        }
        let cache = self.cache.split();
        write_chunk(dst, cache)
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = HttpError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return match item {
                PayloadItem::Chunk(bytes) if bytes.has_remaining() => {
                    warn!(len = bytes.remaining(), "chunk written after end of chunked body");
                    Err(HttpError::write_after_finish(bytes.remaining()))
                }
                PayloadItem::Chunk(_) | PayloadItem::Eof => Ok(()),
            };
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                let len = bytes.remaining();
                if len == 0 {
                    return Ok(());
                }
                if self.cache.len() + len <= self.chunk_size_hint {
                    self.cache.put(bytes);
                    return Ok(());
                }

                self.flush_cache(dst)?;
                if len < self.chunk_size_hint {
                    self.cache.put(bytes);
                    Ok(())
                } else {
                    write_chunk(dst, bytes)
                }
            }
            PayloadItem::Eof => {
                self.flush_cache(dst)?;
                dst.extend_from_slice(b"0\r\n");
                for (name, value) in &mem::take(&mut self.trailers) {
                    dst.reserve(name.as_str().len() + value.len() + 4);
                    dst.extend_from_slice(name.as_str().as_bytes());
                    dst.extend_from_slice(b": ");
                    dst.extend_from_slice(value.as_bytes());
                    dst.extend_from_slice(b"\r\n");
                }
                dst.extend_from_slice(b"\r\n");
                self.eof = true;
                trace!("finished writing chunked data");
                Ok(())
            }
        }
    }
}

fn write_chunk<B: Buf>(dst: &mut BytesMut, bytes: B) -> Result<(), HttpError> {
    let len = bytes.remaining();
    write!(helper::Writer(dst), "{len:X}\r\n")?;
    dst.reserve(len + 2);
    dst.put(bytes);
    dst.extend_from_slice(b"\r\n");
    trace!(len, "wrote chunk");
    Ok(())
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
