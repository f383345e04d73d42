//! Creating and wrapping errors.
//!
//! Every constructor records the location it was called from, and
//! constructors that start a chain also capture a backtrace; see
//! [`fielderr_trace::StackConfig`].
//!
//! Fields are passed as a flat `key, value, key, value, ...` slice and
//! appended to the message as `" key=value"`. Pairs whose key is not a
//! string are skipped, and so is a trailing key without a value.

use std::error::Error as StdError;

use fielderr_trace::TracedError;

use crate::{
    error::{Error, into_cause},
    fields::{build_message, split_args_and_fields},
    format::sprintf,
    value::Value,
};

/// Creates a new error from a message and fields.
///
/// # Examples
///
/// ```
/// let err = fielderr::new("some-err", &[&"field", &"value", &"field2", &vec![123, 321]]);
/// assert_eq!(err.to_string(), "some-err field=value field2=[123 321]");
/// ```
#[track_caller]
#[must_use]
pub fn new(msg: &str, fields: &[&dyn Value]) -> Error {
    Error::from(TracedError::new(build_message(msg, fields)))
}

/// Creates a new error from a format string, format arguments and fields.
///
/// Each `%` in `format` claims one argument; the remaining arguments are
/// fields. When there are fewer arguments than `%` signs, all of them are
/// format arguments. When `format` has no `%` at all, every argument is a
/// field and the format is used verbatim.
///
/// The format is rendered before the fields are appended, so a `%` inside a
/// field value is printed as is and never taken for a directive.
///
/// # Examples
///
/// ```
/// let err = fielderr::errorf("user %s not found", &[&"alice", &"attempt", &3]);
/// assert_eq!(err.to_string(), "user alice not found attempt=3");
/// ```
#[track_caller]
#[must_use]
pub fn errorf(format: &str, args: &[&dyn Value]) -> Error {
    let (format_args, fields) = split_args_and_fields(format, args);
    if format_args.is_empty() {
        return new(format, fields);
    }
    Error::from(TracedError::new(build_message(
        &sprintf(format, format_args),
        fields,
    )))
}

/// Wraps `err` with a message and fields.
///
/// Wrapping an [`Error`] extends its chain; any other error becomes the end
/// of a new chain. Either way the wrapped error stays reachable through
/// [`source`](StdError::source).
///
/// # Examples
///
/// ```
/// let root = fielderr::new("timeout", &[]);
/// let err = fielderr::wrap(root, "fetching page", &[&"url", &"/index"]);
/// assert_eq!(err.to_string(), "fetching page url=/index: timeout");
/// ```
#[track_caller]
#[must_use]
pub fn wrap<E>(err: E, msg: &str, fields: &[&dyn Value]) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error::from(TracedError::wrap(
        into_cause(Box::new(err)),
        build_message(msg, fields),
    ))
}

/// Wraps `err` with a formatted message and fields.
///
/// Arguments are split between the format and the fields as in [`errorf`].
/// When `format` claims no arguments, this is `wrap(err, format, &[])`: the
/// format is used verbatim and every argument is dropped.
///
/// # Examples
///
/// ```
/// let root = fielderr::new("first error", &[]);
/// let err = fielderr::wrapf(root, "third error with %s", &[&"format", &"v", &"a"]);
/// assert_eq!(err.to_string(), "third error with format v=a: first error");
/// ```
#[track_caller]
#[must_use]
pub fn wrapf<E>(err: E, format: &str, args: &[&dyn Value]) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    let (format_args, fields) = split_args_and_fields(format, args);
    if format_args.is_empty() {
        return wrap(err, format, &[]);
    }
    Error::from(TracedError::wrap(
        into_cause(Box::new(err)),
        build_message(&sprintf(format, format_args), fields),
    ))
}

/// Like [`wrap`], but an absent error starts a new chain as [`new`] does.
#[track_caller]
#[must_use]
pub fn wrap_opt<E>(err: Option<E>, msg: &str, fields: &[&dyn Value]) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    match err {
        Some(err) => wrap(err, msg, fields),
        None => new(msg, fields),
    }
}

/// Like [`wrapf`], but an absent error starts a new chain as [`errorf`]
/// does.
#[track_caller]
#[must_use]
pub fn wrapf_opt<E>(err: Option<E>, format: &str, args: &[&dyn Value]) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    match err {
        Some(err) => wrapf(err, format, args),
        None => errorf(format, args),
    }
}
