//! Growable byte storage backing line parsing and buffered writes.

mod byte_buffer;

pub use byte_buffer::BufferError;
pub use byte_buffer::ByteBuffer;
