//! Utility macros shared by the framing modules.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns `Err($error)` instead of panicking. Used for
/// the limit and bounds checks of the buffers and head decoder.
///
/// ```ignore
/// ensure!(line.len() <= max, ProtocolError::line_too_long(max));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
