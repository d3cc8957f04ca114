//! Decides how a message body is framed, per RFC 7230 section 3.3.3.
//!
//! Strict and lax evaluation share one rule table ([`ContentLengthStrategy::determine_length`]);
//! they only differ in what happens when the headers are malformed:
//!
//! | headers                                    | strict                         | lax                          |
//! |--------------------------------------------|--------------------------------|------------------------------|
//! | `Transfer-Encoding: ..., chunked`          | `Chunked` (fails before 1.1)   | `Chunked` (fails before 1.1) |
//! | `Transfer-Encoding: chunked, identity`     | error                          | use `Content-Length`         |
//! | `Transfer-Encoding: ..., identity`         | `Identity`                     | `Identity`                   |
//! | `Transfer-Encoding: ..., gzip`             | error                          | `Chunked` (fails before 1.1) |
//! | `Content-Length` invalid                   | error                          | last valid value or `Identity` |
//! | `Content-Length` values differ             | error                          | last valid value             |
//! | no framing headers                         | implicit length                | implicit length              |
//!
//! Lax mode treating an unknown final coding as chunked is long-standing
//! interoperability behaviour and is kept as is.

use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, Version};
use tracing::{debug, warn};

use crate::ensure;
use crate::protocol::{ContentLength, HttpMessage, ProtocolError};

const CHUNKED: &[u8] = b"chunked";
const IDENTITY: &[u8] = b"identity";

/// Conformance posture of a [`ContentLengthStrategy`].
///
/// No `Default`: callers pick fail-fast or best-effort explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Fail on any malformed or ambiguous framing header.
    Strict,
    /// Degrade to a best-effort framing decision instead of failing.
    Lax,
}

/// Outcome of looking at `Transfer-Encoding` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferEncoding {
    Absent,
    /// Present, but lax mode decided to frame by `Content-Length` instead.
    Ignored,
    Decided(ContentLength),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLengthStrategy {
    strictness: Strictness,
    implicit_length: ContentLength,
    allow_identity: bool,
}

impl ContentLengthStrategy {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness, implicit_length: ContentLength::Identity, allow_identity: true }
    }

    pub fn strict() -> Self {
        Self::new(Strictness::Strict)
    }

    pub fn lax() -> Self {
        Self::new(Strictness::Lax)
    }

    /// Framing used when a message has neither `Transfer-Encoding` nor
    /// `Content-Length`. Servers reading requests use `Length(0)`.
    #[must_use]
    pub fn with_implicit_length(mut self, implicit_length: ContentLength) -> Self {
        self.implicit_length = implicit_length;
        self
    }

    /// Rejects every `Identity` outcome with [`ProtocolError::IdentityNotAllowed`].
    #[must_use]
    pub fn disallow_identity(mut self) -> Self {
        self.allow_identity = false;
        self
    }

    #[inline]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    /// Determines the body framing of `message`.
    ///
    /// Pure: the same headers and version always give the same answer.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] naming the offending header when the
    /// framing headers are invalid under this strategy's [`Strictness`].
    pub fn determine_length<M: HttpMessage + ?Sized>(&self, message: &M) -> Result<ContentLength, ProtocolError> {
        let length = self.evaluate(message.headers(), message.version())?;
        ensure!(self.allow_identity || !length.is_identity(), ProtocolError::IdentityNotAllowed);
        Ok(length)
    }

    fn evaluate(&self, headers: &HeaderMap, version: Version) -> Result<ContentLength, ProtocolError> {
        let transfer_encoding = self.from_transfer_encoding(headers, version)?;
        if let TransferEncoding::Decided(length) = transfer_encoding {
            return Ok(length);
        }

        match (self.from_content_length(headers)?, transfer_encoding) {
            (Some(length), _) => Ok(length),
            (None, TransferEncoding::Ignored) => Ok(ContentLength::Identity),
            (None, _) => Ok(self.implicit_length),
        }
    }

    fn from_transfer_encoding(&self, headers: &HeaderMap, version: Version) -> Result<TransferEncoding, ProtocolError> {
        let codings: Vec<&[u8]> = headers
            .get_all(TRANSFER_ENCODING)
            .iter()
            .flat_map(|value| value.as_bytes().split(|b| *b == b','))
            .map(<[u8]>::trim_ascii)
            .filter(|coding| !coding.is_empty())
            .collect();

        let Some((last, leading)) = codings.split_last() else {
            return Ok(TransferEncoding::Absent);
        };
        let chunked_before_last = leading.iter().any(|coding| coding.eq_ignore_ascii_case(CHUNKED));

        if last.eq_ignore_ascii_case(CHUNKED) {
            ensure!(version >= Version::HTTP_11, ProtocolError::chunked_not_allowed(version));
            if chunked_before_last {
                match self.strictness {
                    Strictness::Strict => {
                        return Err(ProtocolError::malformed_transfer_encoding("chunked applied more than once"));
                    }
                    Strictness::Lax => warn!("chunked applied more than once, treating body as chunked"),
                }
            }
            return Ok(TransferEncoding::Decided(ContentLength::Chunked));
        }

        if chunked_before_last {
            return match self.strictness {
                Strictness::Strict => {
                    Err(ProtocolError::malformed_transfer_encoding("chunked is not the final transfer coding"))
                }
                Strictness::Lax => {
                    warn!("chunked is not the final transfer coding, framing by Content-Length");
                    Ok(TransferEncoding::Ignored)
                }
            };
        }

        if last.eq_ignore_ascii_case(IDENTITY) {
            return Ok(TransferEncoding::Decided(ContentLength::Identity));
        }

        let coding = String::from_utf8_lossy(last);
        match self.strictness {
            Strictness::Strict => Err(ProtocolError::unsupported_transfer_coding(coding)),
            Strictness::Lax => {
                ensure!(version >= Version::HTTP_11, ProtocolError::chunked_not_allowed(version));
                warn!(%coding, "unknown transfer coding, treating body as chunked");
                Ok(TransferEncoding::Decided(ContentLength::Chunked))
            }
        }
    }

    /// `None` only when no `Content-Length` field is present at all.
    fn from_content_length(&self, headers: &HeaderMap) -> Result<Option<ContentLength>, ProtocolError> {
        let mut values = headers
            .get_all(CONTENT_LENGTH)
            .iter()
            .flat_map(|value| value.as_bytes().split(|b| *b == b','))
            .map(<[u8]>::trim_ascii)
            .peekable();

        if values.peek().is_none() {
            return Ok(None);
        }

        match self.strictness {
            Strictness::Strict => {
                let mut lengths: Vec<u64> = Vec::with_capacity(1);
                for raw in values {
                    let length = parse_length(raw)
                        .ok_or_else(|| ProtocolError::invalid_content_length(String::from_utf8_lossy(raw)))?;
                    if !lengths.contains(&length) {
                        lengths.push(length);
                    }
                }

                match lengths.as_slice() {
                    [length] => Ok(Some(ContentLength::Length(*length))),
                    _ => Err(ProtocolError::AmbiguousContentLength { values: lengths }),
                }
            }
            Strictness::Lax => match values.filter_map(parse_length).last() {
                Some(length) => {
                    debug!(length, "using last valid Content-Length");
                    Ok(Some(ContentLength::Length(length)))
                }
                None => {
                    warn!("no valid Content-Length, reading until close");
                    Ok(Some(ContentLength::Identity))
                }
            },
        }
    }
}

/// Digits only; no sign, no whitespace inside, must fit in `u64`.
fn parse_length(raw: &[u8]) -> Option<u64> {
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(raw).ok()?.parse().ok()
}
