use std::io::{self, Read, Write};

use http::Version;
use tracing::debug;

use crate::codec::body::PayloadEncoder;
use crate::codec::entity::EntityWriter;
use crate::config::DEFAULT_CHUNK_SIZE_HINT;
use crate::ensure;
use crate::io::SessionOutputBuffer;
use crate::protocol::{Entity, HttpError, HttpMessage, ProtocolError};
use crate::strategy::ContentLengthStrategy;

/// Frames the body of an outgoing message as its head announces.
///
/// The head must already carry the framing headers; the serializer reads
/// them, it never adds any.
#[derive(Debug, Clone, Copy)]
pub struct EntitySerializer {
    strategy: ContentLengthStrategy,
    chunk_size_hint: usize,
}

impl EntitySerializer {
    pub fn new(strategy: ContentLengthStrategy) -> Self {
        Self { strategy, chunk_size_hint: DEFAULT_CHUNK_SIZE_HINT }
    }

    #[must_use]
    pub fn with_chunk_size_hint(mut self, chunk_size_hint: usize) -> Self {
        self.chunk_size_hint = chunk_size_hint;
        self
    }

    pub fn strategy(&self) -> &ContentLengthStrategy {
        &self.strategy
    }

    /// Returns a writer framing the body of `message` into `output`.
    ///
    /// # Errors
    ///
    /// [`HttpError::Protocol`] when the framing headers are invalid, or when
    /// a strict serializer would have to send an HTTP/1.1 body delimited by
    /// closing the connection.
    pub fn serialize<'a, W, M>(
        &self,
        output: &'a mut SessionOutputBuffer<W>,
        message: &M,
    ) -> Result<EntityWriter<'a, W>, HttpError>
    where
        W: Write,
        M: HttpMessage + ?Sized,
    {
        let length = self.strategy.determine_length(message)?;
        ensure!(
            !(self.strategy.is_strict() && length.is_identity() && message.version() >= Version::HTTP_11),
            ProtocolError::IdentityNotAllowed.into()
        );
        debug!(%length, version = ?message.version(), "serializing entity");

        Ok(EntityWriter::new(output, PayloadEncoder::from_framing(length, self.chunk_size_hint)))
    }

    /// Copies the content of `entity` through a writer for `message` and
    /// finishes the body. Returns the number of content bytes copied.
    pub fn serialize_entity<W, M, B>(
        &self,
        output: &mut SessionOutputBuffer<W>,
        message: &M,
        entity: &mut Entity<B>,
    ) -> Result<u64, HttpError>
    where
        W: Write,
        M: HttpMessage + ?Sized,
        B: Read,
    {
        let mut writer = self.serialize(output, message)?;
        let copied = io::copy(entity.content_mut(), &mut writer)?;
        writer.finish()?;
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, Response};

    use crate::protocol::ContentLength;

    fn response(headers: &[(&str, &str)]) -> Response<()> {
        let mut builder = Response::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn fixed_length_body() {
        let head = response(&[("Content-Length", "11")]);
        let mut output = SessionOutputBuffer::new(Vec::new());

        let mut entity = Entity::from_framing(ContentLength::Length(11), &b"hello world"[..]);
        let copied = EntitySerializer::new(ContentLengthStrategy::strict())
            .serialize_entity(&mut output, &head, &mut entity)
            .unwrap();

        assert_eq!(copied, 11);
        assert_eq!(output.get_ref().as_slice(), b"hello world");
    }

    #[test]
    fn chunked_body_with_trailers() {
        let head = response(&[("Transfer-Encoding", "chunked")]);
        let mut output = SessionOutputBuffer::new(Vec::new());

        let mut writer = EntitySerializer::new(ContentLengthStrategy::strict()).serialize(&mut output, &head).unwrap();
        writer.write_data(b"hello").unwrap();
        writer.write_data(b"").unwrap();
        let mut trailers = HeaderMap::new();
        trailers.insert("x-sum", HeaderValue::from_static("5"));
        writer.finish_with_trailers(trailers).unwrap();

        assert_eq!(output.get_ref().as_slice(), b"5\r\nhello\r\n0\r\nx-sum: 5\r\n\r\n");
    }

    #[test]
    fn writing_past_content_length() {
        let head = response(&[("Content-Length", "2")]);
        let mut output = SessionOutputBuffer::new(Vec::new());

        let mut writer = EntitySerializer::new(ContentLengthStrategy::strict()).serialize(&mut output, &head).unwrap();
        let e = writer.write_data(b"abc").unwrap_err();
        assert!(matches!(e, HttpError::LengthExceeded { declared: 2, attempted: 3 }));

        let io_error = writer.write(b"abc").unwrap_err();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn finishing_short_body_fails() {
        let head = response(&[("Content-Length", "4")]);
        let mut output = SessionOutputBuffer::new(Vec::new());

        let mut writer = EntitySerializer::new(ContentLengthStrategy::lax()).serialize(&mut output, &head).unwrap();
        writer.write_data(b"ab").unwrap();
        let e = writer.finish().unwrap_err();
        assert!(matches!(e.as_protocol(), Some(ProtocolError::Truncated { .. })));
    }

    #[test]
    fn strict_refuses_identity_on_http_11() {
        let head = response(&[]);
        let mut output = SessionOutputBuffer::new(Vec::new());

        let e = EntitySerializer::new(ContentLengthStrategy::strict()).serialize(&mut output, &head).unwrap_err();
        assert_eq!(e.as_protocol(), Some(&ProtocolError::IdentityNotAllowed));

        let writer = EntitySerializer::new(ContentLengthStrategy::lax()).serialize(&mut output, &head).unwrap();
        writer.finish().unwrap();

        let http_10 = Response::builder().version(Version::HTTP_10).body(()).unwrap();
        let writer = EntitySerializer::new(ContentLengthStrategy::strict()).serialize(&mut output, &http_10).unwrap();
        writer.finish().unwrap();
    }
}
