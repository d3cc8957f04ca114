//! HTTP response header handling.

use http::Response;

/// The head of an HTTP response: `http::Response<()>` with an empty body
/// placeholder, to be paired with an [`Entity`](super::Entity) later.
pub type ResponseHead = Response<()>;
