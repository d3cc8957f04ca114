//! Whether a connection may carry another exchange after this response.

use http::header::{CONNECTION, HeaderName};
use http::Version;
use tracing::debug;

use crate::protocol::{Entity, HttpMessage};

const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Anything that can tell whether the underlying transport is still open.
pub trait ConnectionState {
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionReuseStrategy;

impl ConnectionReuseStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Decides whether the connection can be kept alive after `response`.
    ///
    /// `entity` is the response body metadata, `None` when the response has
    /// no body. Rules, in order:
    ///
    /// 1. a closed connection is never reused
    /// 2. a body of unknown length that is not chunked, or a chunked body on
    ///    HTTP/1.0, is delimited by closing the connection
    /// 3. `Connection` (or `Proxy-Connection` when `Connection` is absent)
    ///    containing `close` refuses reuse, containing `keep-alive` allows it
    /// 4. otherwise, reuse for HTTP/1.1 and later
    pub fn keep_alive<M, B, C>(&self, response: &M, entity: Option<&Entity<B>>, connection: &C) -> bool
    where
        M: HttpMessage + ?Sized,
        C: ConnectionState + ?Sized,
    {
        if !connection.is_open() {
            return false;
        }

        let version = response.version();
        if let Some(entity) = entity {
            if entity.content_length().is_none() && !entity.is_chunked() {
                debug!("body delimited by connection close, not reusing");
                return false;
            }
            if entity.is_chunked() && version < Version::HTTP_11 {
                debug!(?version, "chunked body on pre-1.1 connection, not reusing");
                return false;
            }
        }

        let headers = response.headers();
        let name = if headers.contains_key(CONNECTION) { CONNECTION } else { PROXY_CONNECTION };

        let mut keep_alive = false;
        let tokens = headers
            .get_all(name)
            .iter()
            .flat_map(|value| value.as_bytes().split(|b| *b == b','))
            .map(<[u8]>::trim_ascii);
        for token in tokens {
            if token.eq_ignore_ascii_case(b"close") {
                return false;
            }
            if token.eq_ignore_ascii_case(b"keep-alive") {
                keep_alive = true;
            }
        }

        keep_alive || version >= Version::HTTP_11
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Response;

    struct Transport(bool);

    impl ConnectionState for Transport {
        fn is_open(&self) -> bool {
            self.0
        }
    }

    const OPEN: Transport = Transport(true);

    fn response(version: Version, headers: &[(&str, &str)]) -> Response<()> {
        let mut builder = Response::builder().version(version);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn unknown_length_is_not_reused() {
        let strategy = ConnectionReuseStrategy::new();
        let head = response(Version::HTTP_11, &[]);

        assert!(!strategy.keep_alive(&head, Some(&Entity::new(())), &OPEN));
        assert!(strategy.keep_alive(&head, Some(&Entity::new(()).with_content_length(0)), &OPEN));
        assert!(strategy.keep_alive(&head, Some(&Entity::new(()).with_chunked(true)), &OPEN));
        assert!(strategy.keep_alive(&head, None::<&Entity>, &OPEN));
    }

    #[test]
    fn closed_transport_is_not_reused() {
        let head = response(Version::HTTP_11, &[("Connection", "keep-alive")]);
        assert!(!ConnectionReuseStrategy::new().keep_alive(&head, None::<&Entity>, &Transport(false)));
    }

    #[test]
    fn connection_tokens() {
        let strategy = ConnectionReuseStrategy::new();
        let entity = Entity::new(()).with_content_length(5);

        let close = response(Version::HTTP_11, &[("Connection", "Upgrade, Close")]);
        assert!(!strategy.keep_alive(&close, Some(&entity), &OPEN));

        let keep_alive = response(Version::HTTP_10, &[("Connection", "keep-alive")]);
        assert!(strategy.keep_alive(&keep_alive, Some(&entity), &OPEN));

        let both = response(Version::HTTP_10, &[("Connection", "keep-alive"), ("Connection", "close")]);
        assert!(!strategy.keep_alive(&both, Some(&entity), &OPEN));
    }

    #[test]
    fn proxy_connection_is_a_fallback() {
        let strategy = ConnectionReuseStrategy::new();

        let proxy = response(Version::HTTP_10, &[("Proxy-Connection", "keep-alive")]);
        assert!(strategy.keep_alive(&proxy, None::<&Entity>, &OPEN));

        let overridden = response(Version::HTTP_11, &[("Connection", "close"), ("Proxy-Connection", "keep-alive")]);
        assert!(!strategy.keep_alive(&overridden, None::<&Entity>, &OPEN));
    }

    #[test]
    fn version_default() {
        let strategy = ConnectionReuseStrategy::new();
        assert!(strategy.keep_alive(&response(Version::HTTP_11, &[]), None::<&Entity>, &OPEN));
        assert!(!strategy.keep_alive(&response(Version::HTTP_10, &[]), None::<&Entity>, &OPEN));

        let chunked = Entity::new(()).with_chunked(true);
        let http_10 = response(Version::HTTP_10, &[("Connection", "keep-alive")]);
        assert!(!strategy.keep_alive(&http_10, Some(&chunked), &OPEN));
    }
}
