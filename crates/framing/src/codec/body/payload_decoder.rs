//! Decoder for HTTP message payloads.
//!
//! A unified decoder over the three ways an HTTP/1.1 body can be framed:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Bodies delimited by the end of the stream
//!
//! The framing is chosen once, from the [`ContentLength`] decided for the
//! message head.

use std::io::{self, Read};

use http::HeaderMap;

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::identity_decoder::IdentityDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::io::SessionInputBuffer;
use crate::protocol::ContentLength;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Decode payload until the end of the stream
    Identity(IdentityDecoder),
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for a body without bytes.
    pub fn empty() -> Self {
        Self::fix_length(0)
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    /// Chunked, with a limit on the number of trailer fields.
    pub fn chunked_with_max_trailers(max_header_count: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::with_max_header_count(max_header_count)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder reading until the end of the stream.
    pub fn identity() -> Self {
        Self { kind: Kind::Identity(IdentityDecoder::new()) }
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

    pub fn is_completed(&self) -> bool {
        match &self.kind {
            Kind::Length(decoder) => decoder.is_completed(),
            Kind::Chunked(decoder) => decoder.is_completed(),
            Kind::Identity(decoder) => decoder.is_completed(),
        }
    }

    /// Trailer fields; only chunked bodies can carry any.
    pub fn trailers(&self) -> Option<&HeaderMap> {
        match &self.kind {
            Kind::Chunked(decoder) => Some(decoder.trailers()),
            Kind::Length(_) | Kind::Identity(_) => None,
        }
    }

    /// Reads decoded body bytes, delegating to the framing specific decoder.
    ///
    /// Returns 0 once the body is complete.
    pub fn read<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, dst: &mut [u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.read(src, dst),
            Kind::Chunked(decoder) => decoder.read(src, dst),
            Kind::Identity(decoder) => decoder.read(src, dst),
        }
    }
}

impl From<ContentLength> for PayloadDecoder {
    fn from(length: ContentLength) -> Self {
        match length {
            ContentLength::Length(size) => Self::fix_length(size),
            ContentLength::Chunked => Self::chunked(),
            ContentLength::Identity => Self::identity(),
        }
    }
}
