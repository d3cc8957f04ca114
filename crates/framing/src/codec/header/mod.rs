//! HTTP message head processing
//!
//! - [`HeadDecoder`]: reads request and response heads line by line from a
//!   session buffer and parses them with `httparse`, within the configured
//!   [`MessageConstraints`](crate::config::MessageConstraints)
//! - [`HeadEncoder`]: writes request and status lines plus header fields

mod head_decoder;
mod head_encoder;

pub use head_decoder::HeadDecoder;
pub use head_encoder::HeadEncoder;
