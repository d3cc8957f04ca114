//! Framing outcome of a single message.

use std::fmt;

/// How the body of one message is delimited on the wire.
///
/// Computed fresh for every message by
/// [`ContentLengthStrategy`](crate::strategy::ContentLengthStrategy); never
/// cached on the message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContentLength {
    /// Exactly this many body bytes follow the head.
    Length(u64),
    /// `Transfer-Encoding: chunked`.
    Chunked,
    /// No explicit length: the body runs until the connection closes.
    Identity,
}

impl ContentLength {
    /// Integer sentinel of [`ContentLength::Chunked`].
    pub const CHUNKED: i64 = -2;
    /// Integer sentinel of [`ContentLength::Identity`].
    pub const IDENTITY: i64 = -1;

    /// The classic integer encoding: the length itself, or one of the
    /// negative sentinels.
    pub fn as_sentinel(self) -> i64 {
        match self {
            ContentLength::Length(n) => i64::try_from(n).unwrap_or(i64::MAX),
            ContentLength::Chunked => Self::CHUNKED,
            ContentLength::Identity => Self::IDENTITY,
        }
    }

    /// Inverse of [`as_sentinel`](Self::as_sentinel); unknown negatives are `None`.
    pub fn from_sentinel(value: i64) -> Option<Self> {
        match value {
            Self::CHUNKED => Some(ContentLength::Chunked),
            Self::IDENTITY => Some(ContentLength::Identity),
            n => u64::try_from(n).ok().map(ContentLength::Length),
        }
    }

    /// The exact length, if known up front.
    #[inline]
    pub fn exact(self) -> Option<u64> {
        match self {
            ContentLength::Length(n) => Some(n),
            ContentLength::Chunked | ContentLength::Identity => None,
        }
    }

    #[inline]
    pub fn is_chunked(self) -> bool {
        matches!(self, ContentLength::Chunked)
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        matches!(self, ContentLength::Identity)
    }
}

impl fmt::Display for ContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentLength::Length(n) => write!(f, "{n} bytes"),
            ContentLength::Chunked => f.write_str("chunked"),
            ContentLength::Identity => f.write_str("identity"),
        }
    }
}
