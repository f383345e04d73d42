use std::fmt::{self, Write as _};

use crate::{construct::new, error::Error};

const SEPARATOR: &str = "; ";

/// Joins the non-empty renderings of `items` with `"; "`.
pub(crate) fn join_messages<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    let mut joined = String::new();
    for item in items {
        let start = joined.len();
        if start > 0 {
            joined.push_str(SEPARATOR);
        }
        let message_start = joined.len();
        // Writing into a String cannot fail.
        let _ = write!(joined, "{item}");
        if joined.len() == message_start {
            joined.truncate(start);
        }
    }
    joined
}

/// Joins the messages of `errs` into a single new error.
///
/// Messages are separated by `"; "`, and empty messages are skipped along
/// with their separator. Returns `None` when no message is left.
///
/// # Examples
///
/// ```
/// let a = fielderr::new("first error", &[]);
/// let b = fielderr::new("second error", &[]);
///
/// let joined = fielderr::join_errors([&a, &b]).unwrap();
/// assert_eq!(joined.to_string(), "first error; second error");
///
/// assert!(fielderr::join_errors(Vec::<fielderr::Error>::new()).is_none());
///
/// // Absent errors are skipped by flattening
/// let maybe = [None, Some(a), None];
/// let joined = fielderr::join_errors(maybe.iter().flatten()).unwrap();
/// assert_eq!(joined.to_string(), "first error");
/// ```
#[track_caller]
pub fn join_errors<I>(errs: I) -> Option<Error>
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    let joined = join_messages(errs);
    if joined.is_empty() {
        return None;
    }
    Some(new(&joined, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_messages() {
        assert_eq!(join_messages(["a", "b", "c"]), "a; b; c");
        assert_eq!(join_messages(["", "a", "", "b", ""]), "a; b");
        assert_eq!(join_messages(Vec::<String>::new()), "");
    }

    #[test]
    fn test_join_errors() {
        let errs = [
            new("first error", &[]),
            new("", &[]),
            new("second error", &[]),
            new("third error", &[]),
        ];
        let joined = join_errors(&errs).unwrap();
        assert_eq!(joined.to_string(), "first error; second error; third error");
        assert!(join_errors([new("", &[])]).is_none());
    }
}
