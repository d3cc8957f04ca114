//! Binds a framing decision to a session buffer.
//!
//! [`EntityDeserializer`] gives the decoded body of a received message as an
//! [`EntityReader`]; [`EntitySerializer`] gives an [`EntityWriter`] that frames
//! the body of an outgoing one. Both take their [`ContentLengthStrategy`](crate::strategy::ContentLengthStrategy)
//! at construction.

mod entity_deserializer;
mod entity_reader;
mod entity_serializer;
mod entity_writer;

pub use entity_deserializer::EntityDeserializer;
pub use entity_reader::EntityReader;
pub use entity_serializer::EntitySerializer;
pub use entity_writer::EntityWriter;
