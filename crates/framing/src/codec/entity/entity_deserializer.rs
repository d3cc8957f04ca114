use std::io::Read;

use http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;

use crate::codec::body::PayloadDecoder;
use crate::codec::entity::EntityReader;
use crate::config::DEFAULT_MAX_HEADER_COUNT;
use crate::io::SessionInputBuffer;
use crate::protocol::{ContentLength, Entity, HttpError, HttpMessage};
use crate::strategy::ContentLengthStrategy;

/// Turns the head of a received message into a readable [`Entity`].
#[derive(Debug, Clone, Copy)]
pub struct EntityDeserializer {
    strategy: ContentLengthStrategy,
    max_trailer_count: usize,
}

impl EntityDeserializer {
    pub fn new(strategy: ContentLengthStrategy) -> Self {
        Self { strategy, max_trailer_count: DEFAULT_MAX_HEADER_COUNT }
    }

    #[must_use]
    pub fn with_max_trailer_count(mut self, max_trailer_count: usize) -> Self {
        self.max_trailer_count = max_trailer_count;
        self
    }

    pub fn strategy(&self) -> &ContentLengthStrategy {
        &self.strategy
    }

    /// Decides the framing of `message` and binds the matching decoder to
    /// `input`.
    ///
    /// The entity reports `content_length` for length delimited bodies and
    /// `chunked` for chunked ones; `Content-Type` and `Content-Encoding` are
    /// copied from the head.
    ///
    /// # Errors
    ///
    /// [`HttpError::Protocol`] when the framing headers are invalid under the
    /// configured strategy. No byte is read from `input` in that case.
    pub fn deserialize<'a, R, M>(
        &self,
        input: &'a mut SessionInputBuffer<R>,
        message: &M,
    ) -> Result<Entity<EntityReader<'a, R>>, HttpError>
    where
        R: Read,
        M: HttpMessage + ?Sized,
    {
        let length = self.strategy.determine_length(message)?;
        debug!(%length, version = ?message.version(), "deserializing entity");

        let decoder = match length {
            ContentLength::Chunked => PayloadDecoder::chunked_with_max_trailers(self.max_trailer_count),
            length => PayloadDecoder::from(length),
        };

        let headers = message.headers();
        let mut entity = Entity::from_framing(length, EntityReader::new(input, decoder));
        entity.set_content_type(headers.get(CONTENT_TYPE).cloned());
        entity.set_content_encoding(headers.get(CONTENT_ENCODING).cloned());
        Ok(entity)
    }
}
