//! A blocking HTTP/1.1 message framing engine
//!
//! This crate decides, for every HTTP/1.1 message, whether it has a body, how
//! long that body is and which transfer coding carries it, and provides the
//! buffered codecs that read and write such bodies over a blocking transport
//! without ever reading past the end of a message.
//!
//! # Features
//!
//! - RFC 7230 section 3.3 framing rules, in a strict and a lax posture
//! - Chunked, `Content-Length` delimited and close delimited bodies
//! - Chunk trailers in both directions
//! - Session buffers with line reading, bounded refills and byte counters
//! - Connection reuse decision after a response
//! - Message head parsing with `httparse`
//!
//! # Example
//!
//! ```
//! use http::Response;
//! use micro_framing::codec::{EntityDeserializer, EntitySerializer};
//! use micro_framing::io::{SessionInputBuffer, SessionOutputBuffer};
//! use micro_framing::strategy::ContentLengthStrategy;
//! use std::io::{Read, Write};
//!
//! let response = Response::builder().header("Transfer-Encoding", "chunked").body(())?;
//!
//! // frame a body into bytes
//! let mut output = SessionOutputBuffer::new(Vec::new());
//! let mut writer = EntitySerializer::new(ContentLengthStrategy::strict()).serialize(&mut output, &response)?;
//! writer.write_all(b"Hello World!")?;
//! writer.finish()?;
//! let wire = output.into_inner();
//! assert_eq!(wire, b"C\r\nHello World!\r\n0\r\n\r\n");
//!
//! // and read it back
//! let mut input = SessionInputBuffer::new(&wire[..]);
//! let mut entity = EntityDeserializer::new(ContentLengthStrategy::strict()).deserialize(&mut input, &response)?;
//! assert!(entity.is_chunked());
//!
//! let mut body = String::new();
//! entity.content_mut().read_to_string(&mut body)?;
//! assert_eq!(body, "Hello World!");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`buffer`]: growable byte storage for line assembly and buffered writes
//! - [`io`]: session buffers over the transport, and their metrics
//! - [`strategy`]: the framing decision and the connection reuse decision
//! - [`codec`]: head codecs, body codecs, and the entity (de)serializers
//! - [`connection`]: a blocking connection tying all of the above together
//! - [`protocol`]: protocol types and errors
//! - [`config`]: buffer sizes, limits and the conformance posture
//!
//! # Framing
//!
//! [`strategy::ContentLengthStrategy`] looks at `Transfer-Encoding` and
//! `Content-Length` and returns a [`protocol::ContentLength`]:
//! an exact length, chunked, or identity (delimited by closing the
//! connection). The same rules run in [`strategy::Strictness::Strict`] mode,
//! which fails on any malformed or ambiguous header, and in
//! [`strategy::Strictness::Lax`] mode, which falls back to a best-effort
//! decision. There is no default mode.
//!
//! ## Error Handling
//!
//! - [`protocol::HttpError`]: top-level error type, separating protocol
//!   violations, caller mistakes and transport failures
//! - [`protocol::ProtocolError`]: what was wrong on the wire
//! - [`buffer::BufferError`]: out of range buffer access
//!
//! Body readers and writers implement `std::io::Read` / `std::io::Write`, so
//! their errors travel as `std::io::Error`; converting one back into an
//! [`HttpError`](protocol::HttpError) recovers the original category.
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - Blocking I/O only
//! - No content codings: a gzip body is framed, not decompressed

pub mod buffer;
pub mod codec;
pub mod config;
pub mod connection;
pub mod io;
pub mod protocol;
pub mod strategy;

mod utils;
pub(crate) use utils::ensure;
