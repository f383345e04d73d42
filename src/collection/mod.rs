//! Collections that gather many errors into one.
//!
//! - [`List`] keeps every error in insertion order.
//! - [`Set`] keeps one error per distinct message. Adding an error whose
//!   message is already present replaces the stored error but keeps its
//!   position.
//!
//! Both come in a single-threaded flavor and a thread-safe flavor,
//! [`SafeList`] and [`SafeSet`]; see [`markers`](crate::markers).
//!
//! A collection is turned into an error with `err()`, which returns `None`
//! while the collection is empty. The returned [`ListError`] or [`SetError`]
//! is a live view: it renders the current members joined with `"; "`, so
//! errors added after the call still show up.
//!
//! Views of [`SafeList`] and [`SafeSet`] can be wrapped and stored like any
//! other error. Views of the single-threaded [`List`] and [`Set`] are turned
//! into an [`Error`](crate::Error) first, with `From`/`?`, which takes a
//! detached snapshot of the members.
//!
//! ```
//! use fielderr::List;
//!
//! fn validate(name: &str, age: i32) -> Option<fielderr::ListError> {
//!     let errs = List::new();
//!     if name.is_empty() {
//!         errs.new_error("name is empty", &[]);
//!     }
//!     if age < 0 {
//!         errs.new_error("age is negative", &[&"age", &age]);
//!     }
//!     errs.err()
//! }
//!
//! assert!(validate("alice", 30).is_none());
//! let err = validate("", -1).unwrap();
//! assert_eq!(err.to_string(), "name is empty; age is negative age=-1");
//! ```

mod list;
mod set;

use std::{error::Error as StdError, sync::Arc};

pub use self::{
    list::{ErrorList, List, ListError, SafeList},
    set::{ErrorSet, SafeSet, Set, SetError},
};
use crate::inspect::is;

/// A stored member of a collection.
pub type Member = Arc<dyn StdError + Send + Sync + 'static>;

/// Returns `true` when any member matches `target` or one of `more`.
pub(crate) fn members_have(
    members: &[Member],
    target: &(dyn StdError + 'static),
    more: &[&(dyn StdError + 'static)],
) -> bool {
    members.iter().any(|member| {
        let member: &(dyn StdError + 'static) = &**member;
        is(member, target) || more.iter().any(|&other| is(member, other))
    })
}
