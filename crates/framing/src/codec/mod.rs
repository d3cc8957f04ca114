//! HTTP codec module for reading and writing HTTP/1.1 messages
//!
//! # Architecture
//!
//! - Heads: [`HeadDecoder`] and [`HeadEncoder`] in the [`header`] module
//! - Bodies: one decoder and one encoder per framing in the [`body`] module,
//!   dispatched through [`PayloadDecoder`] and [`PayloadEncoder`]
//! - Entities: the [`entity`] module ties a framing decision to a session
//!   buffer, giving an [`EntityReader`] for received bodies and an
//!   [`EntityWriter`] for outgoing ones
//!
//! # Example
//!
//! ```
//! use micro_framing::codec::{EntityDeserializer, HeadDecoder};
//! use micro_framing::io::SessionInputBuffer;
//! use micro_framing::strategy::ContentLengthStrategy;
//! use std::io::Read;
//!
//! let wire = b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
//! let mut input = SessionInputBuffer::new(&wire[..]);
//!
//! let head = HeadDecoder::default().decode_request(&mut input)?.expect("a request");
//! let deserializer = EntityDeserializer::new(ContentLengthStrategy::strict());
//! let mut entity = deserializer.deserialize(&mut input, &head)?;
//!
//! let mut body = String::new();
//! entity.content_mut().read_to_string(&mut body)?;
//! assert_eq!(body, "hello");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod body;
pub mod entity;
pub mod header;

pub use body::{PayloadDecoder, PayloadEncoder};
pub use entity::{EntityDeserializer, EntityReader, EntitySerializer, EntityWriter};
pub use header::{HeadDecoder, HeadEncoder};
