//! Appending `key=value` fields to messages.

use std::fmt::Write as _;

use crate::value::{Rendered, Value};

/// Rough size of one rendered field, used to presize message buffers.
const FIELD_AVERAGE_LEN: usize = 8;

/// Appends `" key=value"` for each pair in `fields` to `base`.
///
/// Pairs whose key is not a string are skipped, as is a trailing key without
/// a value.
///
/// ```
/// let message = fielderr::build_message("retrying", &[&"attempt", &2, &7, &"skipped", &"tail"]);
/// assert_eq!(message, "retrying attempt=2");
/// ```
pub fn build_message(base: &str, fields: &[&dyn Value]) -> String {
    if fields.len() < 2 {
        return base.to_owned();
    }
    let mut message = String::with_capacity(base.len() + fields.len() * FIELD_AVERAGE_LEN);
    message.push_str(base);
    for pair in fields.chunks_exact(2) {
        let Some(key) = pair[0].as_key() else {
            continue;
        };
        // Writing into a String cannot fail.
        let _ = write!(message, " {key}={}", Rendered(pair[1]));
    }
    message
}

/// Splits `args` into format arguments and fields.
///
/// Every `%` in `format` counts as one placeholder, including both halves of
/// a `%%` escape. The first that many arguments feed the format, the rest
/// are fields. When there are no placeholders every argument is a field, and
/// when there are fewer arguments than placeholders there are no fields.
pub(crate) fn split_args_and_fields<'a, 'v>(
    format: &str,
    args: &'a [&'v dyn Value],
) -> (&'a [&'v dyn Value], &'a [&'v dyn Value]) {
    let placeholders = format.bytes().filter(|&b| b == b'%').count();
    args.split_at(placeholders.min(args.len()))
}
