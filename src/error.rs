use std::{error::Error as StdError, fmt, panic::Location};

use fielderr_trace::{BoxedError, Cause, Handle, TracedError, render_tree, write_chain};

use crate::{inspect, value::Value};

/// An error with a message, inline fields and a captured stack.
///
/// Errors are created with [`new`](crate::new), [`errorf`](crate::errorf),
/// [`wrap`](crate::wrap) and [`wrapf`](crate::wrapf), or the macros of the
/// same names. Cloning is cheap; clones share the same chain.
///
/// # Formatting
///
/// - `{}` renders the messages of the whole chain joined with `": "`.
/// - `{:#}` and `{:?}` additionally print the stack of every link, one
///   indented line per frame.
///
/// # Examples
///
/// ```
/// let root = fielderr::new("connection refused", &[&"port", &5432]);
/// let err = fielderr::wrap(root, "loading config", &[]);
///
/// assert_eq!(err.to_string(), "loading config: connection refused port=5432");
/// assert_eq!(err.message(), "loading config");
/// ```
#[derive(Clone)]
pub struct Error {
    traced: TracedError,
}

impl Error {
    /// The message of the outermost link, including its fields but without
    /// the messages of wrapped errors.
    pub fn message(&self) -> &str {
        self.traced.message().unwrap_or_default()
    }

    /// The traced chain behind this error.
    pub fn traced(&self) -> &TracedError {
        &self.traced
    }

    /// Converts this error into its traced chain.
    pub fn into_traced(self) -> TracedError {
        self.traced
    }

    /// The source location this error was created at.
    pub fn location(&self) -> &'static Location<'static> {
        self.traced.location()
    }

    /// Renders the error as a JSON tree; see [`to_json`](crate::to_json).
    pub fn to_json(&self) -> serde_json::Value {
        render_tree::<Error>(self)
    }

    /// The root stack as a logging field; see
    /// [`stack_for_logger`](crate::stack_for_logger).
    pub fn stack_for_logger(&self) -> Option<(&'static str, String)> {
        inspect::stack_field(&self.to_json())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_chain::<Error>(self, f.alternate(), f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_chain::<Error>(self, true, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.traced.source()
    }
}

impl Handle for Error {
    fn traced(&self) -> &TracedError {
        &self.traced
    }
}

impl Value for Error {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<TracedError> for Error {
    fn from(traced: TracedError) -> Self {
        Self { traced }
    }
}

impl From<BoxedError> for Error {
    /// Recovers an [`Error`] that was boxed, or gives any other boxed error
    /// a stack starting at the caller.
    #[track_caller]
    fn from(boxed: BoxedError) -> Self {
        match into_cause(boxed) {
            Cause::Traced(traced) => Self { traced },
            Cause::Foreign(foreign) => Self {
                traced: TracedError::adopt(foreign),
            },
        }
    }
}

/// Unboxes errors that already carry a traced chain.
pub(crate) fn into_cause(boxed: BoxedError) -> Cause {
    let boxed = match boxed.downcast::<Error>() {
        Ok(error) => return Cause::Traced(error.traced),
        Err(boxed) => boxed,
    };
    match boxed.downcast::<TracedError>() {
        Ok(traced) => Cause::Traced(*traced),
        Err(foreign) => Cause::Foreign(foreign),
    }
}
