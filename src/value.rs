//! Values that can appear as fields or format arguments.
//!
//! Field lists and format arguments are slices of `&dyn Value`, so values of
//! different types can be mixed freely:
//!
//! ```
//! use fielderr::Value;
//!
//! let fields: &[&dyn Value] = &[&"user", &"alice", &"retries", &3, &"codes", &vec![404, 503]];
//! let err = fielderr::new("request failed", fields);
//! assert_eq!(err.to_string(), "request failed user=alice retries=3 codes=[404 503]");
//! ```
//!
//! Sequences render as `[a b c]`, maps as `map[k:v k:v]` with entries in key
//! order, and absent options as `<nil>`. Types that are not covered can be
//! passed through [`display`] or [`debug`].

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt,
    rc::Rc,
    sync::Arc,
};

/// A value that can be rendered into an error message.
pub trait Value {
    /// Writes the value the way it appears in messages.
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// The value as a field key.
    ///
    /// Only strings can be keys; a field whose key is not a string is
    /// skipped.
    fn as_key(&self) -> Option<&str> {
        None
    }
}

/// Adapter that renders a [`Value`] through [`fmt::Display`].
pub(crate) struct Rendered<'a>(pub(crate) &'a dyn Value);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_value(f)
    }
}

macro_rules! display_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

display_values!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Value for str {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl Value for String {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl Value for Cow<'_, str> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl Value for () {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{}")
    }
}

impl<T: Value> Value for Option<T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(value) => value.fmt_value(f),
            None => f.write_str("<nil>"),
        }
    }
}

macro_rules! forward_values {
    ($($ptr:ident),*) => {
        $(
            impl<T: Value + ?Sized> Value for $ptr<T> {
                fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    (**self).fmt_value(f)
                }

                fn as_key(&self) -> Option<&str> {
                    (**self).as_key()
                }
            }
        )*
    };
}

forward_values!(Box, Rc, Arc);

impl<T: Value + ?Sized> Value for &T {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt_value(f)
    }

    fn as_key(&self) -> Option<&str> {
        (**self).as_key()
    }
}

fn fmt_seq<'a, I, T>(items: I, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    I: IntoIterator<Item = &'a T>,
    T: Value + ?Sized + 'a,
{
    f.write_str("[")?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        item.fmt_value(f)?;
    }
    f.write_str("]")
}

impl<T: Value> Value for [T] {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(self, f)
    }
}

impl<T: Value, const N: usize> Value for [T; N] {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(self, f)
    }
}

impl<T: Value> Value for Vec<T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(self, f)
    }
}

impl<T: Value> Value for VecDeque<T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(self, f)
    }
}

impl<T: Value> Value for BTreeSet<T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_seq(self, f)
    }
}

impl<T: Value, S> Value for HashSet<T, S> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<String> = self.iter().map(|item| Rendered(item).to_string()).collect();
        items.sort_unstable();
        fmt_seq(&items, f)
    }
}

fn fmt_map<'a, I, K, V>(entries: I, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: Value + ?Sized + 'a,
    V: Value + ?Sized + 'a,
{
    f.write_str("map[")?;
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        key.fmt_value(f)?;
        f.write_str(":")?;
        value.fmt_value(f)?;
    }
    f.write_str("]")
}

impl<K: Value, V: Value> Value for BTreeMap<K, V> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(self, f)
    }
}

impl<K: Value, V: Value, S> Value for HashMap<K, V, S> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(String, &V)> = self
            .iter()
            .map(|(key, value)| (Rendered(key).to_string(), value))
            .collect();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        fmt_map(entries.iter().map(|(key, value)| (key, *value)), f)
    }
}

/// A [`Value`] rendered through the wrapped type's [`fmt::Display`]
/// implementation; see [`display`].
pub struct DisplayValue<'a, T: ?Sized>(&'a T);

/// A [`Value`] rendered through the wrapped type's [`fmt::Debug`]
/// implementation; see [`debug`].
pub struct DebugValue<'a, T: ?Sized>(&'a T);

/// Uses the [`fmt::Display`] output of `value` as a field or argument.
///
/// ```
/// use std::net::Ipv4Addr;
///
/// let addr = Ipv4Addr::LOCALHOST;
/// let err = fielderr::new("bind failed", &[&"addr", &fielderr::display(&addr)]);
/// assert_eq!(err.to_string(), "bind failed addr=127.0.0.1");
/// ```
pub fn display<T: fmt::Display + ?Sized>(value: &T) -> DisplayValue<'_, T> {
    DisplayValue(value)
}

/// Uses the [`fmt::Debug`] output of `value` as a field or argument.
pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> DebugValue<'_, T> {
    DebugValue(value)
}

impl<T: fmt::Display + ?Sized> Value for DisplayValue<'_, T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl<T: fmt::Debug + ?Sized> Value for DebugValue<'_, T> {
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl<T: ?Sized> Clone for DisplayValue<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for DisplayValue<'_, T> {}

impl<T: ?Sized> Clone for DebugValue<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for DebugValue<'_, T> {}
