#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Emit fielderr errors as `tracing` events.
//!
//! Each event carries the rendered error chain in an `error` field and,
//! when the chain has a traced root, its stack in a `stack` field, one frame
//! per line. The stack is the same text [`fielderr::stack_for_logger`]
//! returns.
//!
//! # Quick Start
//!
//! ```
//! use fielderr_tracing::LogExt;
//!
//! fn load(path: &str) -> fielderr::Result<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(|err| fielderr::wrap(err, "loading", &[&"path", &path]))
//! }
//!
//! // Logs at ERROR and hands the result back unchanged
//! let result = load("/does/not/exist").log_err();
//! assert!(result.is_err());
//! ```
//!
//! To add the stack to an event of your own, use [`StackField`]:
//!
//! ```
//! use fielderr_tracing::StackField;
//!
//! let err = fielderr::new("cache miss", &[&"key", &"user:42"]);
//! tracing::info!(error = %err, stack = %StackField::new(&err), "falling back to the database");
//! ```

use std::{error::Error as StdError, fmt};

use fielderr::Error;

/// Renders the root stack of an error chain as a field value.
///
/// Frames are separated by newlines. Chains without a traced root render
/// as nothing.
#[derive(Copy, Clone)]
pub struct StackField<'a>(&'a (dyn StdError + 'static));

impl<'a> StackField<'a> {
    /// Creates the field for the chain of `err`.
    pub fn new(err: &'a (dyn StdError + 'static)) -> Self {
        Self(err)
    }
}

impl fmt::Display for StackField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match fielderr::stack_for_logger(self.0) {
            Some((_, stack)) => f.write_str(&stack),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for StackField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StackField").field(&self.to_string()).finish()
    }
}

macro_rules! emit {
    ($level:ident, $err:expr) => {{
        let err: &(dyn StdError + 'static) = $err;
        match fielderr::stack_for_logger(err) {
            Some((_, stack)) => tracing::$level!(error = %err, stack = %stack),
            None => tracing::$level!(error = %err),
        }
    }};
}

/// Emits `err` as an event at the ERROR level.
///
/// ```
/// let err = fielderr::new("payment declined", &[&"order", &1042]);
/// fielderr_tracing::log_error(&err);
/// ```
pub fn log_error(err: &(dyn StdError + 'static)) {
    emit!(error, err);
}

/// Emits `err` as an event at the WARN level.
pub fn log_warning(err: &(dyn StdError + 'static)) {
    emit!(warn, err);
}

/// Extension trait for logging errors on their way up.
///
/// Both methods emit an event for the error, if there is one, and return
/// `self` unchanged.
///
/// # Examples
///
/// ```
/// use fielderr_tracing::LogExt;
///
/// fn parse(input: &str) -> Result<u16, std::num::ParseIntError> {
///     input.parse::<u16>().log_warn()
/// }
///
/// assert!(parse("80").is_ok());
/// assert!(parse("http").is_err());
/// ```
pub trait LogExt: Sized {
    /// Emits the error at the ERROR level.
    fn log_err(self) -> Self;

    /// Emits the error at the WARN level.
    fn log_warn(self) -> Self;
}

impl<T, E> LogExt for Result<T, E>
where
    E: StdError + 'static,
{
    fn log_err(self) -> Self {
        if let Err(err) = &self {
            log_error(err);
        }
        self
    }

    fn log_warn(self) -> Self {
        if let Err(err) = &self {
            log_warning(err);
        }
        self
    }
}

impl LogExt for Error {
    fn log_err(self) -> Self {
        log_error(&self);
        self
    }

    fn log_warn(self) -> Self {
        log_warning(&self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct ConnectionReset;

    #[test]
    fn test_stack_field_matches_logger_field() {
        let err = fielderr::new("root", &[]);
        let (_, stack) = err.stack_for_logger().unwrap();
        assert_eq!(StackField::new(&err).to_string(), stack);
    }

    #[test]
    fn test_stack_field_without_traced_root() {
        assert_eq!(StackField::new(&ConnectionReset).to_string(), "");
    }
}
