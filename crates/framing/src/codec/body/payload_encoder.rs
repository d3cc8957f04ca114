use bytes::{Buf, BytesMut};
use http::HeaderMap;
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::identity_encoder::IdentityEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::config::DEFAULT_CHUNK_SIZE_HINT;
use crate::protocol::{ContentLength, HttpError, PayloadItem};

/// encode the payload of a message, framed as its head announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// payload delimited by closing the connection
    Identity(IdentityEncoder),
}

impl PayloadEncoder {
    /// create a `PayloadEncoder` for a body without bytes
    pub fn empty() -> Self {
        Self::fix_length(0)
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self::chunked_with_hint(DEFAULT_CHUNK_SIZE_HINT)
    }

    pub fn chunked_with_hint(chunk_size_hint: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::with_chunk_size_hint(chunk_size_hint)) }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    pub fn identity() -> Self {
        Self { kind: Kind::Identity(IdentityEncoder::new()) }
    }

    /// select the encoder for `length`, chunks coalesced up to `chunk_size_hint`
    pub fn from_framing(length: ContentLength, chunk_size_hint: usize) -> Self {
        match length {
            ContentLength::Length(size) => Self::fix_length(size),
            ContentLength::Chunked => Self::chunked_with_hint(chunk_size_hint),
            ContentLength::Identity => Self::identity(),
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, Kind::Identity(_))
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::Identity(encoder) => encoder.is_finish(),
        }
    }

    /// trailers go out after the last chunk; other framings cannot carry them
    pub fn set_trailers(&mut self, trailers: HeaderMap) {
        match &mut self.kind {
            Kind::Chunked(encoder) => encoder.set_trailers(trailers),
            Kind::Length(_) | Kind::Identity(_) => {
                if !trailers.is_empty() {
                    warn!(count = trailers.len(), "body is not chunked, trailers dropped");
                }
            }
        }
    }

    /// push cached chunk data out, a no-op for other framings
    pub fn flush_cache(&mut self, dst: &mut BytesMut) -> Result<(), HttpError> {
        match &mut self.kind {
            Kind::Chunked(encoder) => encoder.flush_cache(dst),
            Kind::Length(_) | Kind::Identity(_) => Ok(()),
        }
    }
}

impl From<ContentLength> for PayloadEncoder {
    fn from(length: ContentLength) -> Self {
        Self::from_framing(length, DEFAULT_CHUNK_SIZE_HINT)
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = HttpError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::Identity(encoder) => encoder.encode(item, dst),
        }
    }
}
