//! HTTP body handling for request and response payloads.
//!
//! Three framings exist for an HTTP/1.1 body, each with a decoder and an
//! encoder:
//!
//! ## Decoders
//! - [`LengthDecoder`]: exactly `Content-Length` bytes
//! - [`ChunkedDecoder`]: chunked transfer coding, trailers included
//! - [`IdentityDecoder`]: everything up to the end of the stream
//! - [`PayloadDecoder`]: picks one of the above from a [`ContentLength`](crate::protocol::ContentLength)
//!
//! Decoders pull from a [`SessionInputBuffer`](crate::io::SessionInputBuffer)
//! and never consume bytes past the end of their body.
//!
//! ## Encoders
//! - [`LengthEncoder`], [`ChunkedEncoder`], [`IdentityEncoder`]
//! - [`PayloadEncoder`]: picks one of the above
//!
//! Encoders are `tokio_util` [`Encoder`](tokio_util::codec::Encoder)s of
//! [`PayloadItem`](crate::protocol::PayloadItem)s into a `BytesMut`, run by
//! [`SessionOutputBuffer::encode`](crate::io::SessionOutputBuffer::encode).

mod chunked_decoder;
mod chunked_encoder;
mod identity_decoder;
mod identity_encoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
pub use identity_decoder::IdentityDecoder;
pub use identity_encoder::IdentityEncoder;
pub use length_decoder::LengthDecoder;
pub use length_encoder::LengthEncoder;
pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
