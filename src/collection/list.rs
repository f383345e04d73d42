use std::{error::Error as StdError, fmt, sync::Arc};

use fielderr_trace::BoxedError;

use super::{Member, members_have};
use crate::{
    error::Error,
    join::join_messages,
    markers::{Local, SendSync, ThreadSafety},
    value::Value,
};

/// An ordered collection of errors that keeps duplicates.
///
/// Use it through [`List`], which lives on one thread, or [`SafeList`],
/// which can be shared between threads. All operations take `&self`.
///
/// Clones share the same storage.
///
/// # Examples
///
/// ```
/// use fielderr::List;
///
/// let errs = List::new();
/// errs.new_error("A", &[]);
/// errs.new_error("A", &[]);
/// errs.errorf("B %d", &[&2]);
/// assert_eq!(errs.len(), 3);
///
/// let err = errs.err().unwrap();
/// assert_eq!(err.to_string(), "A; A; B 2");
/// assert!(fielderr::is(&err, &fielderr::new("B 2", &[])));
/// ```
pub struct ErrorList<T: ThreadSafety> {
    errs: T::Shared<Vec<Member>>,
}

/// An [`ErrorList`] confined to one thread.
pub type List = ErrorList<Local>;

/// An [`ErrorList`] that can be shared between threads.
pub type SafeList = ErrorList<SendSync>;

impl<T: ThreadSafety> ErrorList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            errs: T::share(Vec::new()),
        }
    }

    /// Creates an empty list with room for `capacity` errors.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            errs: T::share(Vec::with_capacity(capacity)),
        }
    }

    /// Appends `err`.
    pub fn add<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        self.push(Arc::new(err));
    }

    /// Appends the error of `result`, if any, and returns its value.
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

    /// Appends a new error; see [`new`](crate::new).
    #[track_caller]
    pub fn new_error(&self, msg: &str, fields: &[&dyn Value]) {
        self.add(crate::new(msg, fields));
    }

    /// Appends a new formatted error; see [`errorf`](crate::errorf).
    #[track_caller]
    pub fn errorf(&self, format: &str, args: &[&dyn Value]) {
        self.add(crate::errorf(format, args));
    }

    /// Appends `err` wrapped with a message; see [`wrap`](crate::wrap).
    #[track_caller]
    pub fn wrap<E>(&self, err: E, msg: &str, fields: &[&dyn Value])
    where
        E: StdError + Send + Sync + 'static,
    {
        self.add(crate::wrap(err, msg, fields));
    }

    /// Appends `err` wrapped with a formatted message; see
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

    /// A live error view of this list, or `None` while it is empty.
    pub fn err(&self) -> Option<ListError<T>> {
        if self.is_empty() {
            return None;
        }
        Some(ListError {
            errs: T::clone_shared(&self.errs),
        })
    }

    /// A snapshot of the current members, in insertion order.
    pub fn errors(&self) -> Vec<Member> {
        T::with(&self.errs, |errs| errs.clone())
    }

    /// Returns `true` when the list holds no errors.
    pub fn is_empty(&self) -> bool {
        T::with(&self.errs, |errs| errs.is_empty())
    }

    /// Returns `true` when the list holds at least one error.
    pub fn not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Removes every error.
    pub fn clear(&self) {
        // Members are dropped after the storage is released.
        let removed = T::with(&self.errs, std::mem::take);
        drop(removed);
    }

    /// The number of errors, duplicates included.
    pub fn len(&self) -> usize {
        T::with(&self.errs, |errs| errs.len())
    }

    fn push(&self, member: Member) {
        T::with(&self.errs, |errs| errs.push(member));
    }
}

impl<T: ThreadSafety> Default for ErrorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ThreadSafety> Clone for ErrorList<T> {
    fn clone(&self) -> Self {
        Self {
            errs: T::clone_shared(&self.errs),
        }
    }
}

impl<T: ThreadSafety> fmt::Debug for ErrorList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.errors().iter().map(|err| err.to_string())).finish()
    }
}

/// The error returned by [`ErrorList::err`].
///
/// It renders the list's current members joined with `"; "`, and
/// [`is`](crate::is) on it matches any member.
///
/// Adding a view to the list it was taken from is not supported.
pub struct ListError<T: ThreadSafety = Local> {
    errs: T::Shared<Vec<Member>>,
}

impl<T: ThreadSafety> ListError<T> {
    /// A snapshot of the current members, in insertion order.
    pub fn errors(&self) -> Vec<Member> {
        T::with(&self.errs, |errs| errs.clone())
    }

    /// A detached copy of this view that can be shared between threads.
    ///
    /// Errors added to the list afterwards do not show up in the copy.
    pub fn snapshot(&self) -> ListError<SendSync> {
        ListError {
            errs: SendSync::share(self.errors()),
        }
    }
}

impl<T: ThreadSafety> From<ListError<T>> for Error {
    /// Turns the view into an [`Error`] holding a
    /// [`snapshot`](ListError::snapshot), so the errors of a [`List`] can be
    /// wrapped or returned with `?`.
    ///
    /// ```
    /// fn validate(name: &str) -> fielderr::Result<()> {
    ///     let errs = fielderr::List::new();
    ///     if name.is_empty() {
    ///         errs.new_error("name is empty", &[]);
    ///     }
    ///     match errs.err() {
    ///         Some(view) => Err(fielderr::wrap(fielderr::Error::from(view), "invalid user", &[])),
    ///         None => Ok(()),
    ///     }
    /// }
    ///
    /// let err = validate("").unwrap_err();
    /// assert_eq!(err.to_string(), "invalid user: name is empty");
    /// assert!(fielderr::is(&err, &fielderr::new("name is empty", &[])));
    /// ```
    #[track_caller]
    fn from(view: ListError<T>) -> Self {
        Error::from(Box::new(view.snapshot()) as BoxedError)
    }
}

impl<T: ThreadSafety> Clone for ListError<T> {
    fn clone(&self) -> Self {
        Self {
            errs: T::clone_shared(&self.errs),
        }
    }
}

impl<T: ThreadSafety> fmt::Display for ListError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_messages(self.errors()))
    }
}

impl<T: ThreadSafety> fmt::Debug for ListError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListError").field(&self.to_string()).finish()
    }
}

impl<T: ThreadSafety> StdError for ListError<T> {}
