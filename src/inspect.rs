//! Inspecting error chains.

use std::{error::Error as StdError, iter};

use fielderr_trace::{chain_equal, find, render_chain, render_tree};
use serde_json::Value as JsonValue;

use crate::{
    collection::{ListError, Member, SetError},
    error::Error,
    markers::{Local, SendSync},
};

/// The composite errors produced by collections.
enum Composite<'a> {
    List(&'a ListError<Local>),
    SafeList(&'a ListError<SendSync>),
    Set(&'a SetError<Local>),
    SafeSet(&'a SetError<SendSync>),
}

impl<'a> Composite<'a> {
    /// The first composite in the chain of `err`.
    fn find(err: &'a (dyn StdError + 'static)) -> Option<Self> {
        iter::successors(Some(err), |&err| err.source()).find_map(Self::of)
    }

    fn of(err: &'a (dyn StdError + 'static)) -> Option<Self> {
        if let Some(list) = err.downcast_ref::<ListError<Local>>() {
            Some(Composite::List(list))
        } else if let Some(list) = err.downcast_ref::<ListError<SendSync>>() {
            Some(Composite::SafeList(list))
        } else if let Some(set) = err.downcast_ref::<SetError<Local>>() {
            Some(Composite::Set(set))
        } else {
            err.downcast_ref::<SetError<SendSync>>().map(Composite::SafeSet)
        }
    }

    fn members(&self) -> Vec<Member> {
        match self {
            Composite::List(list) => list.errors(),
            Composite::SafeList(list) => list.errors(),
            Composite::Set(set) => set.errors(),
            Composite::SafeSet(set) => set.errors(),
        }
    }
}

/// Returns `true` when `target` appears in the chain of `err`.
///
/// Two links match when they are the same error or carry the same message,
/// so an error created separately with an equal message matches too. When
/// the chain of `err` holds an error from [`List::err`](crate::ErrorList::err)
/// or [`Set::err`](crate::ErrorSet::err), the check is made against each of
/// its members instead.
///
/// # Examples
///
/// ```
/// let root = fielderr::new("not found", &[]);
/// let err = fielderr::wrap(root.clone(), "loading user", &[]);
///
/// assert!(fielderr::is(&err, &root));
/// assert!(fielderr::is(&err, &fielderr::new("not found", &[])));
/// assert!(!fielderr::is(&root, &err));
/// ```
pub fn is(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    is_any(err, target, &[])
}

/// Like [`is`], but also succeeds when any of `more` appears in the chain.
pub fn is_any(
    err: &(dyn StdError + 'static),
    target: &(dyn StdError + 'static),
    more: &[&(dyn StdError + 'static)],
) -> bool {
    if let Some(composite) = Composite::find(err) {
        return crate::collection::members_have(&composite.members(), target, more);
    }
    chain_equal::<Error>(err, target) || more.iter().any(|&other| chain_equal::<Error>(err, other))
}

/// [`is_any`] for optional errors.
///
/// Two absent errors are equal. An absent `err` matches nothing, and an
/// absent `target` only leaves `more` to match.
pub fn is_opt(
    err: Option<&(dyn StdError + 'static)>,
    target: Option<&(dyn StdError + 'static)>,
    more: &[&(dyn StdError + 'static)],
) -> bool {
    match (err, target) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(err), Some(target)) => is_any(err, target, more),
        (Some(err), None) => match more.split_first() {
            Some((&first, rest)) => is_any(err, first, rest),
            None => false,
        },
    }
}

/// Returns `true` when the rendered chain of `err` contains `needle`.
///
/// ```
/// let err = fielderr::new("first error", &[&"field1", &"value1"]);
/// assert!(fielderr::contains(&err, "field1=value1"));
/// assert!(!fielderr::contains(&err, "field4"));
/// ```
pub fn contains(err: &(dyn StdError + 'static), needle: &str) -> bool {
    render_chain::<Error>(err, false).contains(needle)
}

/// Returns `true` when the rendered chain of `err` contains the rendered
/// chain of `target`.
pub fn contains_err(err: &(dyn StdError + 'static), target: &(dyn StdError + 'static)) -> bool {
    contains(err, &render_chain::<Error>(target, false))
}

/// Returns `true` when an [`Error`] appears anywhere in the chain of `err`.
pub fn check(err: &(dyn StdError + 'static)) -> bool {
    find::<Error>(err).is_some()
}

/// Renders `err` as a JSON tree.
///
/// The innermost traced error is `root`, with its stack as an array of
/// frames; the errors wrapping it are listed under `wrap`, outermost first,
/// each with its creation location; messages of errors from outside this
/// crate are joined under `external`.
///
/// ```
/// let root = fielderr::new("disk full", &[]);
/// let err = fielderr::wrap(root, "saving profile", &[]);
///
/// let tree = fielderr::to_json(&err);
/// assert_eq!(tree["root"]["message"], "disk full");
/// assert_eq!(tree["wrap"][0]["message"], "saving profile");
/// ```
pub fn to_json(err: &(dyn StdError + 'static)) -> JsonValue {
    render_tree::<Error>(err)
}

/// The root stack of `err` as a `("stack", text)` logging field, with one
/// frame per line.
///
/// `None` when the chain holds no traced error.
pub fn stack_for_logger(err: &(dyn StdError + 'static)) -> Option<(&'static str, String)> {
    stack_field(&to_json(err))
}

pub(crate) fn stack_field(tree: &JsonValue) -> Option<(&'static str, String)> {
    let stack = tree.get("root")?.get("stack")?;
    let text = match stack {
        JsonValue::Array(frames) => frames
            .iter()
            .map(|frame| frame.as_str().map_or_else(|| frame.to_string(), str::to_owned))
            .collect::<Vec<_>>()
            .join("\n"),
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(("stack", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{List, SafeList, SafeSet};

    #[derive(Debug, thiserror::Error)]
    #[error("io failure")]
    struct IoFailure;

    #[test]
    fn test_is_opt() {
        let err = crate::new("A", &[]);
        let other = crate::new("B", &[]);
        assert!(is_opt(None, None, &[]));
        assert!(!is_opt(None, Some(&err), &[]));
        assert!(!is_opt(Some(&err), None, &[]));
        assert!(is_opt(Some(&err), None, &[&other, &err]));
        assert!(is_opt(Some(&err), Some(&other), &[&err]));
        assert!(!is_opt(Some(&err), Some(&other), &[]));
    }

    #[test]
    fn test_is_composite() {
        let errs = List::new();
        errs.new_error("A", &[]);
        errs.wrap(IoFailure, "B", &[]);
        let view = errs.err().unwrap();
        assert!(is(&view, &IoFailure));
        assert!(is(&view, &crate::new("A", &[])));
        assert!(!is(&view, &crate::new("C", &[])));
        assert!(is_any(&view, &crate::new("C", &[]), &[&crate::new("B", &[])]));

        let safe = SafeList::new();
        safe.wrap(IoFailure, "B", &[]);
        let wrapped = crate::wrap(safe.err().unwrap(), "validation", &[]);
        assert!(is(&wrapped, &IoFailure));
        assert!(!is(&wrapped, &crate::new("validation", &[])));
    }

    #[test]
    fn test_is_nested_composite() {
        let inner = SafeSet::new();
        inner.new_error("deep", &[]);
        let outer = SafeSet::new();
        outer.add(inner.err().unwrap());
        let view = outer.err().unwrap();
        assert!(is(&view, &crate::new("deep", &[])));
        assert!(!is(&view, &crate::new("shallow", &[])));
    }

    #[test]
    fn test_check() {
        assert!(check(&crate::new("A", &[])));
        assert!(!check(&IoFailure));
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(crate::new("A", &[]));
        assert!(check(&*boxed));
    }

    #[test]
    fn test_stack_field() {
        let err = crate::new("A", &[]);
        let (key, stack) = stack_for_logger(&err).unwrap();
        assert_eq!(key, "stack");
        assert!(!stack.is_empty());
        assert_eq!(err.stack_for_logger().map(|(_, s)| s), Some(stack));
        assert!(stack_for_logger(&IoFailure).is_none());
    }
}
