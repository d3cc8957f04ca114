use bytes::{Buf, Bytes};
use http::{HeaderMap, Request, Response, Version};

/// The parts of a message the framing engine inspects.
///
/// Implemented for `http::Request<T>` / `http::Response<T>` (and so for
/// [`ResponseHead`](super::ResponseHead)), their `Parts`, and
/// [`RequestHeader`](super::RequestHeader).
pub trait HttpMessage {
    fn headers(&self) -> &HeaderMap;

    fn version(&self) -> Version;
}

impl<T> HttpMessage for Request<T> {
    fn headers(&self) -> &HeaderMap {
        Request::headers(self)
    }

    fn version(&self) -> Version {
        Request::version(self)
    }
}

impl<T> HttpMessage for Response<T> {
    fn headers(&self) -> &HeaderMap {
        Response::headers(self)
    }

    fn version(&self) -> Version {
        Response::version(self)
    }
}

impl HttpMessage for http::request::Parts {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn version(&self) -> Version {
        self.version
    }
}

impl HttpMessage for http::response::Parts {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn version(&self) -> Version {
        self.version
    }
}

impl<M: HttpMessage + ?Sized> HttpMessage for &M {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn version(&self) -> Version {
        (**self).version()
    }
}

/// Represents an item in the HTTP message payload stream.
///
/// Encoders consume these: data chunks, then a single `Eof` which lets the
/// framing emit its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}
