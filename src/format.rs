//! Runtime `%` formatting for messages built from format strings.
//!
//! A directive is `%`, optional flags (`-`, `+`, `0`, `#`, space), an
//! optional width, an optional `.precision` and a verb. Every verb renders
//! its argument's [`Value`] output, except for:
//!
//! - `q`, which quotes the rendered text
//! - `x` and `X`, which print integers in hexadecimal and any other text as
//!   hex bytes
//! - `%%`, which prints a literal `%` and takes no argument
//!
//! Missing arguments render as `%!v(MISSING)`, a directive cut off by the
//! end of the format renders as `%!(NOVERB)`, and unused arguments are
//! listed at the end as `%!(EXTRA a, b)`. A width or precision above
//! 1000000 renders as `%!(BADWIDTH)` or `%!(BADPREC)` and is ignored.
//!
//! Verbs are not checked against the argument: `%d` on a string prints the
//! string as is.

use std::fmt::Write as _;

use crate::value::{Rendered, Value};

/// Largest accepted width or precision.
const MAX_WIDTH: usize = 1_000_000;

/// Decimals needed to print any `f64` exactly.
const EXACT_DECIMALS: usize = 1100;

#[derive(Default)]
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Formats `args` into `format`.
pub(crate) fn sprintf(format: &str, args: &[&dyn Value]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek()
            && matches!(flag, '-' | '+' | '0' | '#' | ' ')
        {
            match flag {
                '-' => spec.minus = true,
                '+' => spec.plus = true,
                '0' => spec.zero = true,
                _ => {}
            }
            chars.next();
        }
        spec.width = parse_number(&mut chars);
        if spec.width.is_some_and(|width| width > MAX_WIDTH) {
            out.push_str("%!(BADWIDTH)");
            spec.width = None;
        }
        if chars.next_if_eq(&'.').is_some() {
            spec.precision = Some(parse_number(&mut chars).unwrap_or(0));
            if spec.precision.is_some_and(|precision| precision > MAX_WIDTH) {
                out.push_str("%!(BADPREC)");
                spec.precision = None;
            }
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(&arg) => {
                next_arg += 1;
                write_arg(&mut out, verb, &spec, arg);
            }
            None => {
                out.push_str("%!");
                out.push(verb);
                out.push_str("(MISSING)");
            }
        }
    }

    if let Some(extra) = args.get(next_arg..)
        && !extra.is_empty()
    {
        out.push_str("%!(EXTRA ");
        for (i, &arg) in extra.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            // Writing into a String cannot fail.
            let _ = write!(out, "{}", Rendered(arg));
        }
        out.push(')');
    }

    out
}

fn parse_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(
            number
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(digit as usize),
        );
    }
    number
}

fn write_arg(out: &mut String, verb: char, spec: &Spec, arg: &dyn Value) {
    let rendered = Rendered(arg).to_string();
    let mut text = match verb {
        'q' => format!("{rendered:?}"),
        'x' => hex(&rendered, false),
        'X' => hex(&rendered, true),
        _ => rendered,
    };

    if let Some(precision) = spec.precision
        && !matches!(verb, 'q' | 'x' | 'X')
    {
        text = truncate(text, precision);
    }
    if spec.plus && !text.starts_with('-') && text.parse::<f64>().is_ok() {
        text.insert(0, '+');
    }

    let len = text.chars().count();
    let pad = spec.width.map_or(0, |width| width.saturating_sub(len));
    if pad == 0 {
        out.push_str(&text);
    } else if spec.minus {
        out.push_str(&text);
        out.extend(std::iter::repeat_n(' ', pad));
    } else if spec.zero {
        let (sign, digits) = match text.strip_prefix(['-', '+']) {
            Some(digits) => text.split_at(text.len() - digits.len()),
            None => ("", text.as_str()),
        };
        out.push_str(sign);
        out.extend(std::iter::repeat_n('0', pad));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat_n(' ', pad));
        out.push_str(&text);
    }
}

fn hex(text: &str, upper: bool) -> String {
    match text.parse::<i128>() {
        Ok(number) => {
            let sign = if number < 0 { "-" } else { "" };
            let magnitude = number.unsigned_abs();
            if upper {
                format!("{sign}{magnitude:X}")
            } else {
                format!("{sign}{magnitude:x}")
            }
        }
        Err(_) if upper => text.bytes().map(|b| format!("{b:02X}")).collect(),
        Err(_) => text.bytes().map(|b| format!("{b:02x}")).collect(),
    }
}

/// Shortens `text` to at most `precision` characters, or to `precision`
/// decimals when it is a decimal number.
fn truncate(text: String, precision: usize) -> String {
    if let Ok(number) = text.parse::<f64>()
        && text.contains('.')
    {
        // Every f64 has an exact expansion within this many decimals.
        let exact = precision.min(EXACT_DECIMALS);
        let mut rounded = format!("{number:.exact$}");
        rounded.extend(std::iter::repeat_n('0', precision - exact));
        return rounded;
    }
    match text.char_indices().nth(precision) {
        Some((end, _)) => text[..end].to_owned(),
        None => text,
    }
}
