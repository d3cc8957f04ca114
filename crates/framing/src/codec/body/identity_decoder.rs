//! Decoder for bodies delimited by closing the connection.

use std::io::{self, Read};

use tracing::trace;

use crate::io::SessionInputBuffer;

/// Reads until the transport reports end of stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityDecoder {
    completed: bool,
}

impl IdentityDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn read<R: Read>(&mut self, src: &mut SessionInputBuffer<R>, dst: &mut [u8]) -> io::Result<usize> {
        if self.completed || dst.is_empty() {
            return Ok(0);
        }

        let n = src.read(dst)?;
        if n == 0 {
            trace!("identity body reached end of stream");
            self.completed = true;
        }
        Ok(n)
    }
}
