use std::{error::Error as StdError, fmt, sync::Arc};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use fielderr_trace::BoxedError;

use super::{Member, members_have};
use crate::{
    error::Error,
    join::join_messages,
    markers::{Local, SendSync, ThreadSafety},
    value::Value,
};

/// Members keyed by their rendered message, in first-insertion order.
type Members = IndexMap<String, Member, FxBuildHasher>;

/// A collection of errors that keeps one error per distinct message.
///
/// Use it through [`Set`], which lives on one thread, or [`SafeSet`], which
/// can be shared between threads. All operations take `&self`.
///
/// Errors are keyed by their [`Display`](fmt::Display) output. Adding an
/// error whose message is already present replaces the stored error in
/// place, so members keep the order in which their message first appeared.
///
/// Clones share the same storage.
///
/// # Examples
///
/// ```
/// use fielderr::Set;
///
/// let errs = Set::new();
/// let err = fielderr::new("A", &[]);
/// errs.add(err.clone());
/// errs.add(err.clone());
/// errs.new_error("A", &[]);
/// assert_eq!(errs.len(), 1);
///
/// errs.wrap(err, "B", &[]);
/// assert_eq!(errs.len(), 2);
/// assert_eq!(errs.err().unwrap().to_string(), "A; B: A");
/// ```
pub struct ErrorSet<T: ThreadSafety> {
    errs: T::Shared<Members>,
}

/// An [`ErrorSet`] confined to one thread.
pub type Set = ErrorSet<Local>;

/// An [`ErrorSet`] that can be shared between threads.
pub type SafeSet = ErrorSet<SendSync>;

impl<T: ThreadSafety> ErrorSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            errs: T::share(Members::with_hasher(FxBuildHasher)),
        }
    }

    /// Creates an empty set with room for `capacity` distinct messages.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            errs: T::share(Members::with_capacity_and_hasher(capacity, FxBuildHasher)),
        }
    }

    /// Adds `err`, replacing any member with the same message.
    pub fn add<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        let member: Member = Arc::new(err);
        let key = member.to_string();
        let replaced = T::with(&self.errs, |errs| errs.insert(key, member));
        drop(replaced);
    }

    /// Adds the error of `result`, if any, and returns its value.
    pub fn add_result<V, E>(&self, result: Result<V, E>) -> Option<V>
    where
        E: StdError + Send + Sync + 'static,
    {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(err);
                None
            }
        }
    }

    /// Adds a new error; see [`new`](crate::new).
    #[track_caller]
    pub fn new_error(&self, msg: &str, fields: &[&dyn Value]) {
        self.add(crate::new(msg, fields));
    }

    /// Adds a new formatted error; see [`errorf`](crate::errorf).
    #[track_caller]
    pub fn errorf(&self, format: &str, args: &[&dyn Value]) {
        self.add(crate::errorf(format, args));
    }

    /// Adds `err` wrapped with a message; see [`wrap`](crate::wrap).
    #[track_caller]
    pub fn wrap<E>(&self, err: E, msg: &str, fields: &[&dyn Value])
    where
        E: StdError + Send + Sync + 'static,
    {
        self.add(crate::wrap(err, msg, fields));
    }

    /// Adds `err` wrapped with a formatted message; see
    /// [`wrapf`](crate::wrapf).
    #[track_caller]
    pub fn wrapf<E>(&self, err: E, format: &str, args: &[&dyn Value])
    where
        E: StdError + Send + Sync + 'static,
    {
        self.add(crate::wrapf(err, format, args));
    }

    /// Returns `true` when some member [`is`](crate::is) `target`.
    pub fn has(&self, target: &(dyn StdError + 'static)) -> bool {
        self.has_any(target, &[])
    }

    /// Returns `true` when some member [`is`](crate::is) `target` or any of
    /// `more`.
    pub fn has_any(
        &self,
        target: &(dyn StdError + 'static),
        more: &[&(dyn StdError + 'static)],
    ) -> bool {
        members_have(&self.errors(), target, more)
    }

    /// A live error view of this set, or `None` while it is empty.
    pub fn err(&self) -> Option<SetError<T>> {
        if self.is_empty() {
            return None;
        }
        Some(SetError {
            errs: T::clone_shared(&self.errs),
        })
    }

    /// A snapshot of the current members, in first-insertion order.
    pub fn errors(&self) -> Vec<Member> {
        snapshot::<T>(&self.errs)
    }

    /// Returns `true` when the set holds no errors.
    pub fn is_empty(&self) -> bool {
        T::with(&self.errs, |errs| errs.is_empty())
    }

    /// Returns `true` when the set holds at least one error.
    pub fn not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Removes every error.
    pub fn clear(&self) {
        let removed = T::with(&self.errs, std::mem::take);
        drop(removed);
    }

    /// The number of distinct messages.
    pub fn len(&self) -> usize {
        T::with(&self.errs, |errs| errs.len())
    }
}

fn snapshot<T: ThreadSafety>(errs: &T::Shared<Members>) -> Vec<Member> {
    T::with(errs, |errs| errs.values().cloned().collect())
}

impl<T: ThreadSafety> Default for ErrorSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ThreadSafety> Clone for ErrorSet<T> {
    fn clone(&self) -> Self {
        Self {
            errs: T::clone_shared(&self.errs),
        }
    }
}

impl<T: ThreadSafety> fmt::Debug for ErrorSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.errors().iter().map(|err| err.to_string())).finish()
    }
}

/// The error returned by [`ErrorSet::err`].
///
/// It renders the set's current members joined with `"; "`, and
/// [`is`](crate::is) on it matches any member.
///
/// Adding a view to the set it was taken from is not supported.
pub struct SetError<T: ThreadSafety = Local> {
    errs: T::Shared<Members>,
}

impl<T: ThreadSafety> SetError<T> {
    /// A snapshot of the current members, in first-insertion order.
    pub fn errors(&self) -> Vec<Member> {
        snapshot::<T>(&self.errs)
    }

    /// A detached copy of this view that can be shared between threads.
    ///
    /// Errors added to the set afterwards do not show up in the copy.
    pub fn snapshot(&self) -> SetError<SendSync> {
        SetError {
            errs: SendSync::share(T::with(&self.errs, |errs| errs.clone())),
        }
    }
}

impl<T: ThreadSafety> From<SetError<T>> for Error {
    /// Turns the view into an [`Error`] holding a [`snapshot`](SetError::snapshot),
    /// so the errors of a [`Set`] can be wrapped or returned with `?`.
    #[track_caller]
    fn from(view: SetError<T>) -> Self {
        Error::from(Box::new(view.snapshot()) as BoxedError)
    }
}

impl<T: ThreadSafety> Clone for SetError<T> {
    fn clone(&self) -> Self {
        Self {
            errs: T::clone_shared(&self.errs),
        }
    }
}

impl<T: ThreadSafety> fmt::Display for SetError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_messages(self.errors()))
    }
}

impl<T: ThreadSafety> fmt::Debug for SetError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetError").field(&self.to_string()).finish()
    }
}

impl<T: ThreadSafety> StdError for SetError<T> {}

#[cfg(test)]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(SafeSet: Send, Sync);
    assert_impl_all!(SetError<SendSync>: Send, Sync, StdError);
    assert_not_impl_any!(Set: Send, Sync);
    assert_not_impl_any!(SetError<Local>: Send, Sync);

    #[derive(Debug, thiserror::Error)]
    #[error("A")]
    struct PlainA;

    #[test]
    fn test_dedup_by_message() {
        let errs = Set::new();
        let err = crate::new("A", &[]);
        errs.add(err.clone());
        assert_eq!(errs.len(), 1);
        errs.add(err.clone());
        assert_eq!(errs.len(), 1);
        errs.new_error("A", &[]);
        assert_eq!(errs.len(), 1);
        errs.wrap(err, "B", &[]);
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn test_last_write_wins_in_place() {
        let errs = Set::new();
        errs.new_error("A", &[]);
        errs.new_error("B", &[]);
        errs.add(PlainA);
        assert_eq!(errs.len(), 2);

        let members = errs.errors();
        assert!(members[0].is::<PlainA>());
        assert_eq!(errs.err().unwrap().to_string(), "A; B");
    }

    #[test]
    fn test_view_is_live() {
        let errs = SafeSet::with_capacity(2);
        assert!(errs.err().is_none());
        errs.errorf("code %d", &[&1]);
        let view = errs.err().unwrap();
        errs.errorf("code %d", &[&2]);
        errs.errorf("code %d", &[&1]);
        assert_eq!(view.to_string(), "code 1; code 2");
        assert_eq!(view.errors().len(), 2);
        errs.clear();
        assert!(errs.is_empty());
        assert!(errs.err().is_none());
        assert_eq!(view.to_string(), "");
    }

    #[test]
    fn test_local_view_into_error() {
        let errs = Set::new();
        errs.wrap(PlainA, "B", &[]);
        let line = line!() + 1;
        let err = crate::wrap(Error::from(errs.err().unwrap()), "validation", &[]);
        errs.new_error("added later", &[]);

        assert_eq!(err.to_string(), "validation: B: A");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("B: A"));
        assert_eq!(err.location().line(), line);
        assert!(crate::is(&err, &PlainA));
        assert!(!crate::is(&err, &crate::new("added later", &[])));
    }

    #[test]
    fn test_has_any() {
        let errs = Set::new();
        errs.wrapf(PlainA, "step %d", &[&3]);
        assert!(errs.has(&PlainA));
        assert!(errs.has(&crate::new("step 3", &[])));
        assert!(!errs.has(&crate::new("step 4", &[])));
        assert!(errs.has_any(&crate::new("step 4", &[]), &[&crate::new("A", &[])]));
    }

    #[test]
    fn test_debug() {
        let errs = Set::new();
        errs.new_error("A", &[]);
        assert!(errs.not_empty());
        assert_eq!(format!("{errs:?}"), "{\"A\"}");
        assert_eq!(format!("{:?}", errs.err().unwrap()), "SetError(\"A\")");
    }
}
