//! Message body metadata plus its content.

use http::HeaderValue;
use http_body::SizeHint;
use mime::Mime;

use crate::protocol::ContentLength;

/// A message body as seen by the framing layer.
///
/// `content` is the body itself: an [`EntityReader`](crate::codec::EntityReader)
/// after deserialization, any `io::Read` to be serialized, or `()` for
/// detached metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity<B = ()> {
    content_length: Option<u64>,
    chunked: bool,
    content_type: Option<HeaderValue>,
    content_encoding: Option<HeaderValue>,
    content: B,
}

impl<B> Entity<B> {
    /// An entity of unknown length that is not chunked.
    pub fn new(content: B) -> Self {
        Self { content_length: None, chunked: false, content_type: None, content_encoding: None, content }
    }

    /// An entity with the metadata implied by a framing decision.
    pub fn from_framing(framing: ContentLength, content: B) -> Self {
        Self { content_length: framing.exact(), chunked: framing.is_chunked(), ..Self::new(content) }
    }

    #[must_use]
    pub fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self.chunked = false;
        self
    }

    #[must_use]
    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.chunked = chunked;
        if chunked {
            self.content_length = None;
        }
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[must_use]
    pub fn with_content_encoding(mut self, content_encoding: HeaderValue) -> Self {
        self.content_encoding = Some(content_encoding);
        self
    }

    pub(crate) fn set_content_type(&mut self, content_type: Option<HeaderValue>) {
        self.content_type = content_type;
    }

    pub(crate) fn set_content_encoding(&mut self, content_encoding: Option<HeaderValue>) {
        self.content_encoding = content_encoding;
    }

    /// The exact body length; `None` for chunked and close-delimited bodies.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    pub fn content_encoding(&self) -> Option<&HeaderValue> {
        self.content_encoding.as_ref()
    }

    /// Parsed `Content-Type`, if present and well formed.
    pub fn mime_type(&self) -> Option<Mime> {
        self.content_type.as_ref()?.to_str().ok()?.parse().ok()
    }

    pub fn size_hint(&self) -> SizeHint {
        match self.content_length {
            Some(length) => SizeHint::with_exact(length),
            None => SizeHint::default(),
        }
    }

    /// The framing this metadata describes.
    pub fn framing(&self) -> ContentLength {
        match (self.chunked, self.content_length) {
            (true, _) => ContentLength::Chunked,
            (false, Some(length)) => ContentLength::Length(length),
            (false, None) => ContentLength::Identity,
        }
    }

    pub fn content(&self) -> &B {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut B {
        &mut self.content
    }

    pub fn into_content(self) -> B {
        self.content
    }

    /// Copies the metadata, leaving the content behind.
    pub fn without_content(&self) -> Entity<()> {
        Entity {
            content_length: self.content_length,
            chunked: self.chunked,
            content_type: self.content_type.clone(),
            content_encoding: self.content_encoding.clone(),
            content: (),
        }
    }
}
