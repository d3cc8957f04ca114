//! Session buffers between the transport and the message codecs.
//!
//! A connection owns one [`SessionInputBuffer`] and one
//! [`SessionOutputBuffer`] for its whole life. Codecs borrow them for the
//! duration of a single message body.

mod metrics;
mod session_input;
mod session_output;
mod timeout;

pub use metrics::ConnectionMetrics;
pub use metrics::TransportMetrics;
pub use session_input::SessionInputBuffer;
pub use session_output::SessionOutputBuffer;
pub use timeout::ReadTimeout;

pub(crate) use session_input::is_timeout;
