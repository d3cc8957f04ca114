//! Core HTTP protocol types used by the framing engine.
//!
//! - **Messages** ([`message`]): the [`HttpMessage`] view of a head, and the
//!   [`PayloadItem`] stream fed to encoders
//! - **Heads** ([`request`], [`response`]): [`RequestHeader`] and
//!   [`ResponseHead`]
//! - **Framing** ([`length`], [`entity`]): the [`ContentLength`] decision and
//!   the [`Entity`] it produces
//! - **Errors** ([`error`]): [`HttpError`] and [`ProtocolError`]

mod message;
pub use message::HttpMessage;
pub use message::PayloadItem;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod length;
pub use length::ContentLength;

mod entity;
pub use entity::Entity;

mod error;
pub use error::HttpError;
pub use error::ProtocolError;
