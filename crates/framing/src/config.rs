//! Connection level configuration.
//!
//! [`H1Config`] has no `Default`; the caller always picks a [`Strictness`].

use crate::strategy::Strictness;

/// Default size of the session input and output buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Writes at least this long bypass the output buffer.
pub const DEFAULT_FRAGMENT_SIZE_HINT: usize = 8 * 1024;

/// Bytes collected by the chunked encoder before a chunk is emitted.
pub const DEFAULT_CHUNK_SIZE_HINT: usize = 2 * 1024;

/// Maximum length of a single head or trailer line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;

/// Maximum number of header (or trailer) fields in one message.
pub const DEFAULT_MAX_HEADER_COUNT: usize = 64;

/// Limits applied while parsing message heads and chunk trailers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageConstraints {
    pub max_line_length: usize,
    pub max_header_count: usize,
}

impl MessageConstraints {
    pub const fn new(max_line_length: usize, max_header_count: usize) -> Self {
        Self { max_line_length, max_header_count }
    }

    /// No limits at all, for trusted peers and tests.
    pub const fn unlimited() -> Self {
        Self { max_line_length: usize::MAX, max_header_count: usize::MAX }
    }
}

impl Default for MessageConstraints {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_HEADER_COUNT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H1Config {
    strictness: Strictness,
    buffer_size: usize,
    fragment_size_hint: usize,
    chunk_size_hint: usize,
    constraints: MessageConstraints,
}

impl H1Config {
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            buffer_size: DEFAULT_BUFFER_SIZE,
            fragment_size_hint: DEFAULT_FRAGMENT_SIZE_HINT,
            chunk_size_hint: DEFAULT_CHUNK_SIZE_HINT,
            constraints: MessageConstraints::default(),
        }
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    #[must_use]
    pub fn with_fragment_size_hint(mut self, fragment_size_hint: usize) -> Self {
        self.fragment_size_hint = fragment_size_hint;
        self
    }

    #[must_use]
    pub fn with_chunk_size_hint(mut self, chunk_size_hint: usize) -> Self {
        self.chunk_size_hint = chunk_size_hint;
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: MessageConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn fragment_size_hint(&self) -> usize {
        self.fragment_size_hint
    }

    pub fn chunk_size_hint(&self) -> usize {
        self.chunk_size_hint
    }

    pub fn constraints(&self) -> MessageConstraints {
        self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = H1Config::new(Strictness::Lax)
            .with_buffer_size(0)
            .with_chunk_size_hint(16)
            .with_constraints(MessageConstraints::new(128, 4));

        assert_eq!(config.strictness(), Strictness::Lax);
        assert_eq!(config.buffer_size(), 1);
        assert_eq!(config.fragment_size_hint(), DEFAULT_FRAGMENT_SIZE_HINT);
        assert_eq!(config.chunk_size_hint(), 16);
        assert_eq!(config.constraints().max_header_count, 4);
    }
}
