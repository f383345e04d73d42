#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Traced error chains for the `fielderr` error library.
//!
//! A [`TracedError`] is one link of an error chain. Each link carries a
//! message and the [`Stack`] recorded where it was created, and may wrap
//! another traced link or a foreign error. Links are reference counted, so
//! cloning a chain is cheap.
//!
//! # Quick Start
//!
//! ```rust
//! use fielderr_trace::{Cause, TracedError, render_tree};
//!
//! let root = TracedError::new("disk full");
//! let err = TracedError::wrap(Cause::Traced(root), "saving profile");
//!
//! assert_eq!(err.to_string(), "saving profile: disk full");
//!
//! // `{:#}` also prints the stack of every link
//! println!("{err:#}");
//!
//! let tree = render_tree::<TracedError>(&err);
//! assert_eq!(tree["root"]["message"], "disk full");
//! assert_eq!(tree["wrap"][0]["message"], "saving profile");
//! ```
//!
//! # Stacks
//!
//! Links that start a chain capture a filtered backtrace when the
//! `backtrace` feature is enabled (the default). Links that wrap another
//! traced link only record their location. See [`StackConfig`] for the
//! environment variables and settings that change this.
//!
//! # Debugging symbols in release builds
//!
//! To get useful frames in release builds, keep debug symbols:
//!
//! ```toml
//! [profile.release]
//! strip = false
//! # You can also set this to "line-tables-only" for smaller binaries
//! debug = true
//! ```

mod chain;
pub mod config;
mod render;
pub mod stack;
mod traced;

pub use self::{
    chain::{Chain, Link, chain_equal, find},
    config::{CaptureMode, ConfigAlreadyInstalledError, StackConfig, StackFilter},
    render::{render_chain, render_tree, write_chain},
    stack::{Backtrace, BacktraceEntry, Frame, FramePath, FramePrefix, Stack},
    traced::{BoxedError, Cause, Handle, TracedError},
};
