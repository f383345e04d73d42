use std::{error::Error as StdError, fmt, panic::Location};

use triomphe::Arc;

use crate::{config::StackConfig, render, stack::Stack};

/// A boxed error that is not a [`TracedError`].
pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// The error a [`TracedError`] wraps.
pub enum Cause {
    /// Another traced error.
    Traced(TracedError),
    /// An error from outside this crate.
    Foreign(BoxedError),
}

struct Node {
    message: Option<String>,
    stack: Stack,
    cause: Option<Cause>,
}

/// One link of an error chain, with the stack recorded where it was created.
///
/// Cloning is cheap and yields a handle to the same link; see
/// [`TracedError::ptr_eq`].
///
/// The [`Display`](fmt::Display) implementation renders the messages of the
/// whole chain joined with `": "`. The alternate form `{:#}` and the
/// [`Debug`](fmt::Debug) implementation also print each link's stack.
///
/// # Examples
///
/// ```rust
/// use fielderr_trace::{Cause, TracedError};
///
/// let root = TracedError::new("disk full");
/// let err = TracedError::wrap(Cause::Traced(root), "saving profile");
/// assert_eq!(err.to_string(), "saving profile: disk full");
/// ```
#[derive(Clone)]
pub struct TracedError(Arc<Node>);

impl TracedError {
    /// Starts a new chain.
    ///
    /// Records the caller location and, depending on the current
    /// [`StackConfig`], a backtrace.
    #[track_caller]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let stack = StackConfig::current().root_stack(Location::caller());
        Self::from_parts(Some(message.into()), stack, None)
    }

    /// Adds a link on top of `cause`.
    ///
    /// Wrapping another traced error records the caller location only,
    /// unless [`CaptureMode::All`](crate::CaptureMode::All) is configured.
    /// Wrapping a foreign error starts a traced chain and so is treated like
    /// [`TracedError::new`].
    #[track_caller]
    #[must_use]
    pub fn wrap(cause: Cause, message: impl Into<String>) -> Self {
        let config = StackConfig::current();
        let stack = match &cause {
            Cause::Traced(_) => config.wrap_stack(Location::caller()),
            Cause::Foreign(_) => config.root_stack(Location::caller()),
        };
        Self::from_parts(Some(message.into()), stack, Some(cause))
    }

    /// Gives a foreign error a stack without adding a message of its own.
    ///
    /// The adopted link reports the foreign error's message as its own, so
    /// it renders exactly like the foreign error.
    #[track_caller]
    #[must_use]
    pub fn adopt(foreign: BoxedError) -> Self {
        let stack = StackConfig::current().root_stack(Location::caller());
        Self::from_parts(None, stack, Some(Cause::Foreign(foreign)))
    }

    fn from_parts(message: Option<String>, stack: Stack, cause: Option<Cause>) -> Self {
        Self(Arc::new(Node {
            message,
            stack,
            cause,
        }))
    }

    /// The message of this link alone.
    ///
    /// `None` for links created by [`TracedError::adopt`].
    pub fn message(&self) -> Option<&str> {
        self.0.message.as_deref()
    }

    /// The stack recorded when this link was created.
    pub fn stack(&self) -> &Stack {
        &self.0.stack
    }

    /// The source location this link was created at.
    pub fn location(&self) -> &'static Location<'static> {
        self.0.stack.location()
    }

    /// The error this link wraps.
    pub fn cause(&self) -> Option<&Cause> {
        self.0.cause.as_ref()
    }

    /// The foreign error this link wraps directly, if any.
    pub fn foreign(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self.cause()? {
            Cause::Foreign(foreign) => Some(&**foreign),
            Cause::Traced(_) => None,
        }
    }

    /// Returns `true` when both handles refer to the same link.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_chain::<TracedError>(self, f.alternate(), f)
    }
}

impl fmt::Debug for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_chain::<TracedError>(self, true, f)
    }
}

impl StdError for TracedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.cause()? {
            Cause::Traced(traced) => Some(traced),
            Cause::Foreign(foreign) => Some(&**foreign),
        }
    }
}

/// An error type that is a thin handle around a [`TracedError`].
///
/// Chain walks look through handles, so a handle and the traced error it
/// holds are treated as the same link.
pub trait Handle: StdError + 'static {
    /// The traced error behind this handle.
    fn traced(&self) -> &TracedError;
}

impl Handle for TracedError {
    fn traced(&self) -> &TracedError {
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
    fn test_new_and_wrap() {
        let root = TracedError::new("root");
        let line = line!() + 1;
        let wrapped = TracedError::wrap(Cause::Traced(root.clone()), "outer");
        assert_eq!(wrapped.message(), Some("outer"));
        assert_eq!(wrapped.to_string(), "outer: root");
        assert_eq!(wrapped.location().line(), line);
        assert_eq!(wrapped.location().file(), file!());
        assert!(wrapped.stack().backtrace().is_none());

        let source = wrapped.source().unwrap();
        let source = source.downcast_ref::<TracedError>().unwrap();
        assert!(source.ptr_eq(&root));
        assert!(!source.ptr_eq(&wrapped));
    }

    #[test]
    fn test_wrap_foreign() {
        let err = TracedError::wrap(Cause::Foreign(Box::new(ConnectionReset)), "request failed");
        assert_eq!(err.to_string(), "request failed: connection reset");
        assert!(err.foreign().is_some());
        assert!(err.source().unwrap().is::<ConnectionReset>());
    }

    #[test]
    fn test_adopt() {
        let err = TracedError::adopt(Box::new(ConnectionReset));
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_clone_shares_link() {
        let err = TracedError::new("shared");
        let clone = err.clone();
        assert!(err.ptr_eq(&clone));
        assert!(!err.ptr_eq(&TracedError::new("shared")));
    }

    #[test]
    fn test_empty_message() {
        let err = TracedError::new("");
        assert_eq!(err.to_string(), "");
        let wrapped = TracedError::wrap(Cause::Traced(err), "outer");
        assert_eq!(wrapped.to_string(), "outer: ");
    }
}
