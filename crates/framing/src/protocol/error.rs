use std::io;
use thiserror::Error;

/// Top-level error of the framing engine.
///
/// The three variants are the three failure categories a caller has to tell
/// apart: the peer broke the wire protocol, the caller broke the framing
/// contract, or the transport failed.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("protocol violation: {source}")]
    Protocol {
        #[from]
        source: ProtocolError,
    },

    #[error("content length exceeded: declared {declared} bytes, attempted to write {attempted}")]
    LengthExceeded { declared: u64, attempted: u64 },

    #[error("body already finished, {len} more bytes rejected")]
    WriteAfterFinish { len: usize },

    #[error("io error: {source}")]
    Io { source: io::Error },
}

impl HttpError {
    pub fn length_exceeded(declared: u64, attempted: u64) -> Self {
        Self::LengthExceeded { declared, attempted }
    }

    pub fn write_after_finish(len: usize) -> Self {
        Self::WriteAfterFinish { len }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, HttpError::Protocol { .. })
    }

    /// Returns the protocol violation, if this error is one.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            HttpError::Protocol { source } => Some(source),
            _ => None,
        }
    }
}

/// Codecs surface their failures through `io::Read`/`io::Write`, so a protocol
/// violation may arrive here wrapped in an `io::Error`. Unwrap it again so the
/// caller still sees the right category.
impl From<io::Error> for HttpError {
    fn from(e: io::Error) -> Self {
        let wraps_framing_error =
            e.get_ref().is_some_and(|inner| inner.is::<ProtocolError>() || inner.is::<HttpError>());
        if !wraps_framing_error {
            return HttpError::Io { source: e };
        }

        let kind = e.kind();
        let Some(inner) = e.into_inner() else {
            return HttpError::Io { source: io::Error::from(kind) };
        };

        match inner.downcast::<ProtocolError>() {
            Ok(protocol) => HttpError::Protocol { source: *protocol },
            Err(other) => match other.downcast::<HttpError>() {
                Ok(http) => *http,
                Err(other) => HttpError::Io { source: io::Error::new(kind, other) },
            },
        }
    }
}

impl From<HttpError> for io::Error {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Io { source } => source,
            HttpError::Protocol { source } => source.into(),
            e @ (HttpError::LengthExceeded { .. } | HttpError::WriteAfterFinish { .. }) => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
        }
    }
}

/// Violations of HTTP/1.1 message framing found on the wire or in headers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("invalid Content-Length header: {value:?}")]
    InvalidContentLength { value: String },

    #[error("ambiguous Content-Length headers: {values:?}")]
    AmbiguousContentLength { values: Vec<u64> },

    #[error("chunked Transfer-Encoding is not allowed for {version}")]
    ChunkedNotAllowed { version: String },

    #[error("unsupported transfer coding in Transfer-Encoding header: {coding}")]
    UnsupportedTransferCoding { coding: String },

    #[error("malformed Transfer-Encoding header: {reason}")]
    MalformedTransferEncoding { reason: String },

    #[error("identity transfer coding without Content-Length is not allowed")]
    IdentityNotAllowed,

    #[error("invalid chunk: {reason}")]
    InvalidChunk { reason: String },

    #[error("premature end of message body, expected {expected}, received {received} bytes")]
    Truncated { expected: String, received: u64 },

    #[error("line length exceeds the limit {max_length}")]
    LineTooLong { max_length: usize },

    #[error("header number exceeds the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid message head: {reason}")]
    InvalidHead { reason: String },
}

impl ProtocolError {
    pub fn invalid_content_length<S: ToString>(value: S) -> Self {
        Self::InvalidContentLength { value: value.to_string() }
    }

    pub fn chunked_not_allowed(version: http::Version) -> Self {
        Self::ChunkedNotAllowed { version: format!("{version:?}") }
    }

    pub fn unsupported_transfer_coding<S: ToString>(coding: S) -> Self {
        Self::UnsupportedTransferCoding { coding: coding.to_string() }
    }

    pub fn malformed_transfer_encoding<S: ToString>(reason: S) -> Self {
        Self::MalformedTransferEncoding { reason: reason.to_string() }
    }

    pub fn invalid_chunk<S: ToString>(reason: S) -> Self {
        Self::InvalidChunk { reason: reason.to_string() }
    }

    /// Body ended early; `expected` describes what the framing promised.
    pub fn truncated<S: ToString>(expected: S, received: u64) -> Self {
        Self::Truncated { expected: expected.to_string(), received }
    }

    pub fn line_too_long(max_length: usize) -> Self {
        Self::LineTooLong { max_length }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_head<S: ToString>(reason: S) -> Self {
        Self::InvalidHead { reason: reason.to_string() }
    }
}

impl From<ProtocolError> for io::Error {
    fn from(e: ProtocolError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_survives_io_round_trip() {
        let io_error: io::Error = ProtocolError::invalid_chunk("bad size").into();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidData);

        let error = HttpError::from(io_error);
        assert_eq!(error.as_protocol(), Some(&ProtocolError::invalid_chunk("bad size")));
    }

    #[test]
    fn length_exceeded_survives_io_round_trip() {
        let io_error: io::Error = HttpError::length_exceeded(3, 5).into();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidInput);

        let error = HttpError::from(io_error);
        assert!(matches!(error, HttpError::LengthExceeded { declared: 3, attempted: 5 }));
    }

    #[test]
    fn write_after_finish_survives_io_round_trip() {
        let io_error: io::Error = HttpError::write_after_finish(4).into();
        assert_eq!(io_error.kind(), io::ErrorKind::InvalidInput);
        assert!(matches!(HttpError::from(io_error), HttpError::WriteAfterFinish { len: 4 }));
    }

    #[test]
    fn plain_io_error_stays_io() {
        let error = HttpError::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(matches!(error, HttpError::Io { ref source } if source.kind() == io::ErrorKind::ConnectionReset));
        assert!(!error.is_protocol());
    }

    #[test]
    fn display_names_the_header() {
        let error = ProtocolError::invalid_content_length("xxx");
        assert_eq!(error.to_string(), "invalid Content-Length header: \"xxx\"");
    }
}
