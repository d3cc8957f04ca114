use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::protocol::{HttpError, PayloadItem};

/// Passes body bytes through; the body ends when the connection closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityEncoder {
    eof: bool,
}

impl IdentityEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for IdentityEncoder {
    type Error = HttpError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) if self.eof => match bytes.remaining() {
                0 => Ok(()),
                len => {
                    warn!(len, "write after end of identity body");
                    Err(HttpError::write_after_finish(len))
                }
            },
            PayloadItem::Chunk(bytes) => {
                dst.put(bytes);
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                Ok(())
            }
        }
    }
}
