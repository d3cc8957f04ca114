//! Framing and connection reuse decisions.

mod content_length;
mod reuse;

pub use content_length::ContentLengthStrategy;
pub use content_length::Strictness;
pub use reuse::ConnectionReuseStrategy;
pub use reuse::ConnectionState;
