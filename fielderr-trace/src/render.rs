use std::{error::Error as StdError, fmt};

use serde_json::{Map, Value, json};

use crate::{
    chain::{Chain, Link},
    traced::Handle,
};

const STACK_INDENT: &str = "    ";

/// Writes the chain of `err` to `out`.
///
/// The compact form joins the link messages with `": "`. The verbose form
/// puts every link on its own line followed by its stack, one indented line
/// per frame.
pub fn write_chain<H: Handle>(
    err: &(dyn StdError + 'static),
    verbose: bool,
    out: &mut dyn fmt::Write,
) -> fmt::Result {
    for (i, link) in Chain::<H>::new(err).enumerate() {
        if i > 0 {
            out.write_str(if verbose { "\n" } else { ": " })?;
        }
        out.write_str(&link.message())?;
        if verbose && let Link::Traced(traced) = link {
            for frame in traced.stack().frames() {
                out.write_str("\n")?;
                out.write_str(STACK_INDENT)?;
                out.write_str(&frame)?;
            }
        }
    }
    Ok(())
}

/// Renders the chain of `err` to a string; see [`write_chain`].
pub fn render_chain<H: Handle>(err: &(dyn StdError + 'static), verbose: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_chain::<H>(err, verbose, &mut out);
    out
}

/// Renders the chain of `err` as a JSON tree.
///
/// The innermost traced link becomes `root`, carrying its full stack as an
/// array of frames. The traced links wrapping it become `wrap`, outermost
/// first, each with its creation location. Messages of foreign errors in the
/// chain are joined into `external`. Keys without content are left out.
///
/// ```json
/// {
///   "root": { "message": "disk full", "stack": ["save - [..]/src/store.rs:40"] },
///   "wrap": [{ "message": "saving profile", "stack": "src/profile.rs:12:9" }],
///   "external": "No space left on device"
/// }
/// ```
pub fn render_tree<H: Handle>(err: &(dyn StdError + 'static)) -> Value {
    let mut traced = Vec::new();
    let mut external = Vec::new();
    for link in Chain::<H>::new(err) {
        match link {
            Link::Traced(node) => {
                if node.message().is_none()
                    && let Some(foreign) = node.foreign()
                {
                    external.push(foreign.to_string());
                }
                traced.push((link.message(), node));
            }
            Link::Foreign(_) => external.push(link.message().into_owned()),
        }
    }

    let mut tree = Map::new();
    if let Some(((message, root), wraps)) = traced.split_last() {
        tree.insert(
            "root".to_owned(),
            json!({
                "message": message,
                "stack": root.stack().frames(),
            }),
        );
        if !wraps.is_empty() {
            let wraps: Vec<Value> = wraps
                .iter()
                .map(|(message, node)| {
                    json!({
                        "message": message,
                        "stack": node.location().to_string(),
                    })
                })
                .collect();
            tree.insert("wrap".to_owned(), Value::Array(wraps));
        }
    }
    if !external.is_empty() {
        tree.insert("external".to_owned(), Value::String(external.join(": ")));
    }
    Value::Object(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traced::{Cause, TracedError};

    #[derive(Debug, thiserror::Error)]
    #[error("no space left on device")]
    struct NoSpace;

    #[test]
    fn test_render_compact() {
        let root = TracedError::new("disk full");
        let err = TracedError::wrap(Cause::Traced(root), "saving profile");
        assert_eq!(
            render_chain::<TracedError>(&err, false),
            "saving profile: disk full"
        );
    }

    #[test]
    fn test_render_verbose() {
        let root = TracedError::new("disk full");
        let line = line!() + 1;
        let err = TracedError::wrap(Cause::Traced(root), "saving profile");
        let rendered = render_chain::<TracedError>(&err, true);
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("saving profile"));
        assert!(
            lines
                .next()
                .is_some_and(|l| l.starts_with(&format!("{STACK_INDENT}{}:{line}:", file!())))
        );
        assert!(rendered.contains("\ndisk full\n    "));
        assert_eq!(format!("{err:#}"), rendered);
        assert_eq!(format!("{err:?}"), rendered);
    }

    #[test]
    fn test_render_tree() {
        let root = TracedError::wrap(Cause::Foreign(Box::new(NoSpace)), "disk full");
        let mid = TracedError::wrap(Cause::Traced(root), "saving profile");
        let top = TracedError::wrap(Cause::Traced(mid.clone()), "handling request");
        let tree = render_tree::<TracedError>(&top);

        assert_eq!(tree["root"]["message"], "disk full");
        assert!(tree["root"]["stack"].as_array().is_some_and(|s| !s.is_empty()));
        assert_eq!(tree["wrap"][0]["message"], "handling request");
        assert_eq!(tree["wrap"][1]["message"], "saving profile");
        assert_eq!(
            tree["wrap"][1]["stack"],
            mid.location().to_string().as_str()
        );
        assert_eq!(tree["external"], "no space left on device");
    }

    #[test]
    fn test_render_tree_adopted() {
        let err = TracedError::adopt(Box::new(NoSpace));
        let tree = render_tree::<TracedError>(&err);
        assert_eq!(tree["root"]["message"], "no space left on device");
        assert!(tree.get("wrap").is_none());
        assert_eq!(tree["external"], "no space left on device");

        let tree = render_tree::<TracedError>(&NoSpace);
        assert!(tree.get("root").is_none());
        assert_eq!(tree["external"], "no space left on device");
    }
}
