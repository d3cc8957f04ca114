//! Blocking HTTP/1.1 connection handling
//!
//! [`HttpConnection`] binds the session buffers of one transport to the head
//! codecs, the entity (de)serializers and the connection reuse decision. It
//! can act as either side of an exchange: [`HttpConnection::server`] reads
//! requests and writes responses, [`HttpConnection::client`] the reverse.

mod http_connection;

pub use http_connection::HttpConnection;
