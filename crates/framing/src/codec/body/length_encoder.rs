use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::protocol::{HttpError, PayloadItem, ProtocolError};

/// Writes exactly `length` body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    remaining: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, remaining: length }
    }

    pub fn is_finish(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = HttpError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                let len = bytes.remaining() as u64;
                if len == 0 {
                    return Ok(());
                }
                if len > self.remaining {
                    warn!(declared = self.length, len, remaining = self.remaining, "write past declared length");
                    let written = self.length - self.remaining;
                    return Err(HttpError::length_exceeded(self.length, written + len));
                }
                dst.put(bytes);
                self.remaining -= len;
                Ok(())
            }
            PayloadItem::Eof if self.remaining > 0 => {
                let written = self.length - self.remaining;
                Err(ProtocolError::truncated(format!("{} bytes", self.length), written).into())
            }
            PayloadItem::Eof => Ok(()),
        }
    }
}
