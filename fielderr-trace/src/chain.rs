use std::{borrow::Cow, error::Error as StdError, iter, marker::PhantomData};

use crate::traced::{Handle, TracedError};

/// One link of an error chain as seen by a chain walk.
#[derive(Clone, Copy)]
pub enum Link<'a> {
    /// A traced link.
    Traced(&'a TracedError),
    /// An error from outside this crate.
    Foreign(&'a (dyn StdError + 'static)),
}

impl<'a> Link<'a> {
    /// Classifies `err`, looking through handles of type `H`.
    pub fn of<H: Handle>(err: &'a (dyn StdError + 'static)) -> Self {
        if let Some(handle) = err.downcast_ref::<H>() {
            Link::Traced(handle.traced())
        } else if let Some(traced) = err.downcast_ref::<TracedError>() {
            Link::Traced(traced)
        } else {
            Link::Foreign(err)
        }
    }

    /// The message of this link alone, without the rest of the chain.
    ///
    /// Foreign errors have no notion of their own message, so their full
    /// [`Display`](std::fmt::Display) output is used.
    pub fn message(&self) -> Cow<'a, str> {
        match *self {
            Link::Traced(traced) => match (traced.message(), traced.foreign()) {
                (Some(message), _) => Cow::Borrowed(message),
                (None, Some(foreign)) => Cow::Owned(foreign.to_string()),
                (None, None) => Cow::Borrowed(""),
            },
            Link::Foreign(err) => Cow::Owned(err.to_string()),
        }
    }

    /// Returns `true` when both links are the same error, or carry the same
    /// message.
    pub fn matches(&self, other: &Link<'_>) -> bool {
        match (self, other) {
            (Link::Traced(a), Link::Traced(b)) if a.ptr_eq(b) => return true,
            (Link::Foreign(a), Link::Foreign(b)) if std::ptr::addr_eq(*a, *b) => return true,
            _ => {}
        }
        self.message() == other.message()
    }

    fn source(&self) -> Option<&'a (dyn StdError + 'static)> {
        match *self {
            // Adopted links already speak for the foreign error they hold.
            Link::Traced(traced) if traced.message().is_none() => traced.foreign()?.source(),
            Link::Traced(traced) => traced.source(),
            Link::Foreign(err) => err.source(),
        }
    }
}

/// Iterator over the links of an error chain, outermost first.
///
/// Handles of type `H` are looked through.
pub struct Chain<'a, H> {
    next: Option<&'a (dyn StdError + 'static)>,
    _handle: PhantomData<fn() -> H>,
}

impl<'a, H: Handle> Chain<'a, H> {
    /// Starts a walk at `err`.
    pub fn new(err: &'a (dyn StdError + 'static)) -> Self {
        Self {
            next: Some(err),
            _handle: PhantomData,
        }
    }
}

impl<'a, H: Handle> Iterator for Chain<'a, H> {
    type Item = Link<'a>;

    fn next(&mut self) -> Option<Link<'a>> {
        let link = Link::of::<H>(self.next?);
        self.next = link.source();
        Some(link)
    }
}

/// Returns `true` when any link of `err` matches the outermost link of
/// `target`.
///
/// Links match when they are the same error or carry the same message, so
/// two errors created separately with equal messages compare equal.
///
/// # Examples
///
/// ```rust
/// use fielderr_trace::{Cause, TracedError, chain_equal};
///
/// let root = TracedError::new("not found");
/// let err = TracedError::wrap(Cause::Traced(root), "loading user");
///
/// assert!(chain_equal::<TracedError>(&err, &TracedError::new("not found")));
/// assert!(!chain_equal::<TracedError>(&err, &TracedError::new("timeout")));
/// ```
pub fn chain_equal<H: Handle>(
    err: &(dyn StdError + 'static),
    target: &(dyn StdError + 'static),
) -> bool {
    let Some(target) = Chain::<H>::new(target).next() else {
        return false;
    };
    Chain::<H>::new(err).any(|link| link.matches(&target))
}

/// Finds the first error of type `T` in the source chain of `err`,
/// starting with `err` itself.
pub fn find<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    iter::successors(Some(err), |&err| err.source()).find_map(|err| err.downcast_ref::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traced::Cause;

    #[derive(Debug, thiserror::Error)]
    #[error("timeout")]
    struct Timeout;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct RequestFailed(#[source] Timeout);

    fn messages(err: &(dyn StdError + 'static)) -> Vec<String> {
        Chain::<TracedError>::new(err)
            .map(|link| link.message().into_owned())
            .collect()
    }

    #[test]
    fn test_chain_messages() {
        let root = TracedError::new("root");
        let mid = TracedError::wrap(Cause::Traced(root), "mid");
        let top = TracedError::wrap(Cause::Traced(mid), "top");
        assert_eq!(messages(&top), vec!["top", "mid", "root"]);
    }

    #[test]
    fn test_chain_through_foreign() {
        let err = TracedError::wrap(Cause::Foreign(Box::new(RequestFailed(Timeout))), "call");
        assert_eq!(messages(&err), vec!["call", "request failed", "timeout"]);

        let adopted = TracedError::adopt(Box::new(RequestFailed(Timeout)));
        assert_eq!(messages(&adopted), vec!["request failed", "timeout"]);
    }

    #[test]
    fn test_chain_equal() {
        let root = TracedError::new("root");
        let err = TracedError::wrap(Cause::Traced(root.clone()), "outer");

        assert!(chain_equal::<TracedError>(&err, &err));
        assert!(chain_equal::<TracedError>(&err, &root));
        assert!(chain_equal::<TracedError>(&err, &TracedError::new("outer")));
        assert!(!chain_equal::<TracedError>(&root, &err));
        assert!(!chain_equal::<TracedError>(&err, &TracedError::new("other")));
    }

    #[test]
    fn test_chain_equal_foreign() {
        let err = TracedError::wrap(Cause::Foreign(Box::new(Timeout)), "call");
        assert!(chain_equal::<TracedError>(&err, &Timeout));
        assert!(chain_equal::<TracedError>(&Timeout, &Timeout));

        let adopted = TracedError::adopt(Box::new(Timeout));
        assert!(chain_equal::<TracedError>(&err, &adopted));
        assert!(chain_equal::<TracedError>(&adopted, &Timeout));
    }

    #[test]
    fn test_find() {
        let err = TracedError::wrap(Cause::Foreign(Box::new(RequestFailed(Timeout))), "call");
        assert!(find::<Timeout>(&err).is_some());
        assert!(find::<TracedError>(&err).is_some());
        assert!(find::<TracedError>(&Timeout).is_none());
    }
}
