#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Errors with inline fields, captured stacks and collections.
//!
//! ## Overview
//!
//! Errors are built from a message and a flat list of key/value fields that
//! are rendered into the message itself, so a plain `to_string()` is enough
//! to log them. Every error records where it was created; the error that
//! starts a chain also captures a filtered backtrace.
//!
//! Wrapping adds context and keeps the wrapped error reachable through
//! [`source`](std::error::Error::source). [`is`] compares chains by message,
//! [`contains`] searches their rendering and [`to_json`] turns them into a
//! tree for structured logging.
//!
//! ## Quick Example
//!
//! ```
//! fn read_config(path: &str) -> fielderr::Result<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(|err| fielderr::wrap(err, "reading config", &[&"path", &path]))
//! }
//!
//! let err = read_config("/does/not/exist").unwrap_err();
//! assert!(err.to_string().starts_with("reading config path=/does/not/exist: "));
//! assert!(fielderr::check(&err));
//! ```
//!
//! ## Formatting and fields
//!
//! [`errorf`] and [`wrapf`] take a printf-style format. Each `%` in the
//! format claims one argument and the remaining arguments become fields:
//!
//! ```
//! let err = fielderr::errorf("retry %d of %d", &[&2, &5, &"host", &"db-1"]);
//! assert_eq!(err.to_string(), "retry 2 of 5 host=db-1");
//! ```
//!
//! Any type implementing [`Value`] can be passed; wrap other types with
//! [`display`] or [`debug`].
//!
//! ## Collections
//!
//! [`List`] and [`Set`] gather several errors, for example while
//! validating input, and turn them into a single error with `err()`. Their
//! [`SafeList`] and [`SafeSet`] counterparts can be shared between threads.
//!
//! ```
//! let errs = fielderr::Set::new();
//! for name in ["", "", "bob"] {
//!     if name.is_empty() {
//!         errs.new_error("empty name", &[]);
//!     }
//! }
//! assert_eq!(errs.len(), 1);
//! assert_eq!(errs.err().unwrap().to_string(), "empty name");
//! ```
//!
//! ## Stacks
//!
//! Backtraces are captured when the `backtrace` feature is enabled, which
//! it is by default. `FIELDERR_STACK=off` turns capture off and
//! `RUST_BACKTRACE=full` turns frame filtering off; see [`StackConfig`] for
//! the details and for installing a configuration programmatically.
//!
//! ## Feature flags
//!
//! - `backtrace` (default): capture backtraces for root errors.
//! - `compat-anyhow1`: conversions from `anyhow` 1.x errors.
//! - `compat-eyre06`: conversions from `eyre` 0.6.x reports.

mod collection;
pub mod compat;
mod construct;
mod error;
mod fields;
mod format;
mod inspect;
mod join;
mod macros;
pub mod markers;
pub mod prelude;
pub mod value;

pub use fielderr_trace::{CaptureMode, ConfigAlreadyInstalledError, StackConfig, StackFilter};

pub use self::{
    collection::{
        ErrorList, ErrorSet, List, ListError, Member, SafeList, SafeSet, Set, SetError,
    },
    construct::{errorf, new, wrap, wrap_opt, wrapf, wrapf_opt},
    error::Error,
    fields::build_message,
    inspect::{check, contains, contains_err, is, is_any, is_opt, stack_for_logger, to_json},
    join::join_errors,
    value::{DebugValue, DisplayValue, Value, debug, display},
};

/// A `Result` whose error is an [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod __private {
    pub use core::result::Result::Err;
}
