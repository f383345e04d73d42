//! Call-stack capture for traced errors.
//!
//! Every traced error records the source location it was created at. With
//! the `backtrace` feature enabled, errors that start a chain additionally
//! record a filtered backtrace beginning at that location.

use std::{borrow::Cow, fmt, panic::Location};

use crate::config::StackFilter;

/// The call stack recorded for a single traced error.
#[derive(Debug)]
pub struct Stack {
    location: &'static Location<'static>,
    backtrace: Option<Backtrace>,
    show_full_path: bool,
}

/// A captured and filtered backtrace.
#[derive(Debug)]
pub struct Backtrace {
    /// The frames and omission markers, most recent call first.
    pub entries: Vec<BacktraceEntry>,
    /// The total number of frames that were dropped by the filter.
    pub total_omitted_frames: usize,
}

/// A single entry in a [`Backtrace`].
#[derive(Debug)]
pub enum BacktraceEntry {
    /// A run of consecutive frames from a crate that is hidden in the middle
    /// of a backtrace.
    OmittedFrames {
        /// Number of frames collapsed into this entry.
        count: usize,
        /// Name of the crate the frames belong to.
        skipped_crate: &'static str,
    },
    /// A resolved stack frame.
    Frame(Frame),
}

/// A resolved stack frame.
#[derive(Debug)]
pub struct Frame {
    /// The demangled symbol name, without the trailing hash.
    pub sym_demangled: String,
    /// The source file the frame belongs to, when known.
    pub frame_path: Option<FramePath>,
    /// The line number within [`Frame::frame_path`], when known.
    pub lineno: Option<u32>,
}

/// The source path of a [`Frame`].
#[derive(Debug)]
pub struct FramePath {
    /// The path as reported by the debug information.
    pub raw_path: String,
    /// The crate the path belongs to, when it could be recognized.
    pub crate_name: Option<Cow<'static, str>>,
    /// The path split into a well-known prefix and the remainder.
    pub split_path: Option<FramePrefix>,
}

/// A frame path decomposed into a well-known prefix and a suffix.
#[derive(Debug)]
pub struct FramePrefix {
    /// The kind of prefix that was recognized.
    ///
    /// One of `"RUST_SRC"`, `"CARGO"` or `"FIELDERR"`.
    pub prefix_kind: &'static str,
    /// The prefix that was removed from the raw path.
    pub prefix: String,
    /// The rest of the path, starting at the crate directory.
    ///
    /// Example: `"indexmap-2.12.1/src/map/core/entry.rs"`
    pub suffix: String,
}

impl Stack {
    /// Records only the caller location.
    pub fn location_only(location: &'static Location<'static>) -> Self {
        Self {
            location,
            backtrace: None,
            show_full_path: false,
        }
    }

    /// Records the caller location together with a filtered backtrace.
    ///
    /// Without the `backtrace` feature this is the same as
    /// [`Stack::location_only`].
    pub fn capture(location: &'static Location<'static>, filter: &StackFilter) -> Self {
        Self {
            location,
            backtrace: Backtrace::capture(location, filter),
            show_full_path: filter.show_full_path,
        }
    }

    /// The source location the error was created at.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The captured backtrace, if one was recorded.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    /// Renders the stack as one line per entry, most recent call first.
    ///
    /// When no backtrace is available the only line is the creation
    /// location.
    pub fn frames(&self) -> Vec<String> {
        match &self.backtrace {
            Some(backtrace) if !backtrace.entries.is_empty() => backtrace
                .entries
                .iter()
                .map(|entry| entry.render(self.show_full_path))
                .collect(),
            _ => vec![self.location.to_string()],
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(frame)?;
        }
        Ok(())
    }
}

impl BacktraceEntry {
    fn render(&self, show_full_path: bool) -> String {
        match self {
            BacktraceEntry::OmittedFrames {
                count,
                skipped_crate,
            } => format!("... omitted {count} frame(s) from crate '{skipped_crate}' ..."),
            BacktraceEntry::Frame(frame) => frame.render(show_full_path),
        }
    }

    fn frame_count(&self) -> usize {
        match self {
            BacktraceEntry::OmittedFrames { count, .. } => *count,
            BacktraceEntry::Frame(_) => 1,
        }
    }

    fn is_final_noise(&self, filter: &StackFilter) -> bool {
        match self {
            BacktraceEntry::OmittedFrames { skipped_crate, .. } => {
                filter.skipped_final_crates.contains(skipped_crate)
            }
            BacktraceEntry::Frame(frame) => {
                frame
                    .crate_name()
                    .is_some_and(|name| filter.skipped_final_crates.contains(&name))
                    || matches!(
                        frame.sym_demangled.as_str(),
                        "__libc_start_call_main" | "__libc_start_main_impl"
                    )
                    || (frame.sym_demangled == "_start"
                        && frame
                            .frame_path
                            .as_ref()
                            .is_some_and(|path| path.raw_path.contains("zig/libc/glibc")))
            }
        }
    }
}

impl Frame {
    fn crate_name(&self) -> Option<&str> {
        self.frame_path.as_ref()?.crate_name.as_deref()
    }

    fn is_at(&self, location: &Location<'_>) -> bool {
        self.lineno == Some(location.line())
            && self.frame_path.as_ref().is_some_and(|path| {
                path.raw_path
                    .replace('\\', "/")
                    .ends_with(&location.file().replace('\\', "/"))
            })
    }

    fn render(&self, show_full_path: bool) -> String {
        let mut out = String::from(function_name(&self.sym_demangled));
        if let Some(path) = &self.frame_path {
            out.push_str(" - ");
            match &path.split_path {
                Some(split_path) if !show_full_path => {
                    out.push_str("[..]/");
                    out.push_str(&split_path.suffix);
                }
                _ => out.push_str(&path.raw_path),
            }
            if let Some(lineno) = self.lineno {
                out.push(':');
                out.push_str(&lineno.to_string());
            }
        }
        out
    }
}

/// Extracts the bare function name from a demangled symbol path.
///
/// `my_crate::module::Type<T>::function` becomes `function`, and closures
/// keep their `{{closure}}` marker.
fn function_name(s: &str) -> &str {
    let mut word_start = 0usize;
    let mut word_end = 0usize;
    let mut angle_nesting_level = 0u64;
    let mut curly_nesting_level = 0u64;
    let mut potential_function_arrow = false;
    let mut inside_word = false;

    for (i, c) in s.char_indices() {
        if curly_nesting_level == 0 && angle_nesting_level == 0 {
            if !inside_word && is_ident_start(c) {
                word_start = i;
                inside_word = true;
            } else if inside_word && !is_ident_continue(c) {
                word_end = i;
                inside_word = false;
            }
        }

        let was_potential_function_arrow = potential_function_arrow;
        potential_function_arrow = c == '-';

        if c == '<' {
            angle_nesting_level = angle_nesting_level.saturating_add(1);
        } else if c == '>' && !was_potential_function_arrow {
            angle_nesting_level = angle_nesting_level.saturating_sub(1);
        } else if c == '{' {
            curly_nesting_level = curly_nesting_level.saturating_add(1);
            if !inside_word && curly_nesting_level == 1 && angle_nesting_level == 0 {
                word_start = i;
                inside_word = true;
            }
        } else if c == '}' {
            curly_nesting_level = curly_nesting_level.saturating_sub(1);
            if inside_word && curly_nesting_level == 0 {
                word_end = i + 1;
                inside_word = false;
            }
        }
    }

    if word_start < word_end {
        &s[word_start..word_end]
    } else {
        &s[word_start..]
    }
}

#[cfg(feature = "backtrace")]
fn is_ident_start(c: char) -> bool {
    unicode_ident::is_xid_start(c)
}

#[cfg(feature = "backtrace")]
fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "backtrace"))]
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[cfg(not(feature = "backtrace"))]
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl Backtrace {
    /// Captures the current backtrace and filters it.
    ///
    /// Frames above `location` belong to the capturing machinery and are
    /// dropped. Returns `None` when nothing could be resolved.
    #[cfg(feature = "backtrace")]
    pub fn capture(location: &'static Location<'static>, filter: &StackFilter) -> Option<Self> {
        let mut frames: Vec<Frame> = Vec::new();

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                // Frames without a symbol name or file carry nothing to show.
                let (Some(sym), Some(filename_raw)) = (symbol.name(), symbol.filename_raw()) else {
                    return;
                };
                frames.push(Frame {
                    sym_demangled: format!("{sym:#}"),
                    frame_path: Some(FramePath::new(filename_raw)),
                    lineno: symbol.lineno(),
                });
            });
            true
        });

        Self::from_frames(frames, location, filter)
    }

    /// Backtraces are unavailable without the `backtrace` feature.
    #[cfg(not(feature = "backtrace"))]
    pub fn capture(_location: &'static Location<'static>, _filter: &StackFilter) -> Option<Self> {
        None
    }

    #[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
    fn from_frames(frames: Vec<Frame>, location: &Location<'_>, filter: &StackFilter) -> Option<Self> {
        let start = match frames.iter().position(|frame| frame.is_at(location)) {
            Some(start) => start,
            None => frames
                .iter()
                .position(|frame| {
                    !frame
                        .crate_name()
                        .is_some_and(|name| filter.skipped_initial_crates.contains(&name))
                })
                .unwrap_or(frames.len()),
        };
        let mut total_omitted_frames = start;
        let mut entries: Vec<BacktraceEntry> = Vec::new();
        let mut omitted: Option<(&'static str, Vec<Frame>)> = None;

        for frame in frames.into_iter().skip(start) {
            let skipped = frame.crate_name().and_then(|name| {
                filter
                    .skipped_middle_crates
                    .iter()
                    .find(|&&skipped| skipped == name)
                    .copied()
            });

            if let Some(name) = skipped
                && let Some((current, group)) = omitted.as_mut()
                && *current == name
            {
                group.push(frame);
                continue;
            }

            if let Some((name, group)) = omitted.take() {
                total_omitted_frames += push_omitted(&mut entries, name, group);
            }

            match skipped {
                Some(name) => omitted = Some((name, vec![frame])),
                None => entries.push(BacktraceEntry::Frame(frame)),
            }
        }

        if let Some((name, group)) = omitted.take() {
            total_omitted_frames += push_omitted(&mut entries, name, group);
        }

        while let Some(last) = entries.last() {
            if !last.is_final_noise(filter) {
                break;
            }
            total_omitted_frames += last.frame_count();
            entries.pop();
        }

        if entries.len() > filter.max_entry_count {
            total_omitted_frames += entries
                .drain(filter.max_entry_count..)
                .map(|entry| entry.frame_count())
                .sum::<usize>();
        }

        if entries.is_empty() && total_omitted_frames == 0 {
            None
        } else {
            Some(Self {
                entries,
                total_omitted_frames,
            })
        }
    }
}

/// A lone hidden frame is kept as is; longer runs collapse into one marker.
#[cfg_attr(not(feature = "backtrace"), allow(dead_code))]
fn push_omitted(entries: &mut Vec<BacktraceEntry>, name: &'static str, mut group: Vec<Frame>) -> usize {
    if group.len() == 1
        && let Some(frame) = group.pop()
    {
        entries.push(BacktraceEntry::Frame(frame));
        return 0;
    }
    let count = group.len();
    entries.push(BacktraceEntry::OmittedFrames {
        count,
        skipped_crate: name,
    });
    count
}

/// The directory of this crate as seen by the compiler, e.g.
/// `/home/user/.cargo/registry/src/index.crates.io-1949cf8c6b5b557f/fielderr-trace-0.1.0`.
#[cfg(feature = "backtrace")]
const fn crate_dir(location: &'static Location<'static>) -> Option<&'static str> {
    let file = location.file();
    let Some(prefix_len) = file.len().checked_sub("/src/stack.rs".len()) else {
        return None;
    };
    let (prefix, _) = file.split_at(prefix_len);
    if prefix.is_empty() { None } else { Some(prefix) }
}

#[cfg(feature = "backtrace")]
const TRACE_CRATE_DIR: Option<&str> = crate_dir(Location::caller());

#[cfg(feature = "backtrace")]
impl FramePath {
    fn new(path: backtrace::BytesOrWideString<'_>) -> Self {
        use std::sync::OnceLock;

        static REGEXES: OnceLock<[regex::Regex; 2]> = OnceLock::new();
        let [std_regex, registry_regex] = REGEXES.get_or_init(|| {
            [
                // - /lib/rustlib/src/rust/library/{std|core|alloc}/src/...
                // - /rustc/{40-char-hash}/library/{std|core|alloc}/src/...
                regex::Regex::new(
                    r"(?:/lib/rustlib/src/rust|^/rustc/[0-9a-f]{40})/library/(std|core|alloc)/src/.*$",
                )
                .expect("built-in regex pattern for std library paths should be valid"),
                // - /.cargo/registry/src/{index}-{16-char-hash}/{crate}-{version}/src/...
                regex::Regex::new(
                    r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/([^./]+)-[0-9]+\.[^/]*/src/.*$",
                )
                .expect("built-in regex pattern for cargo registry paths should be valid"),
            ]
        });

        let raw_path = path.to_str_lossy().into_owned();

        let known = [(std_regex, "RUST_SRC"), (registry_regex, "CARGO")]
            .into_iter()
            .find_map(|(regex, prefix_kind)| {
                let crate_capture = regex.captures(&raw_path)?.get(1)?;
                let split = crate_capture.start();
                Some((
                    Cow::Owned(crate_capture.as_str().to_owned()),
                    FramePrefix {
                        prefix_kind,
                        prefix: raw_path[..split.saturating_sub(1)].to_owned(),
                        suffix: raw_path[split..].to_owned(),
                    },
                ))
            });

        if let Some((crate_name, split_path)) = known {
            return Self {
                crate_name: Some(crate_name),
                split_path: Some(split_path),
                raw_path,
            };
        }

        if let Some(dir) = TRACE_CRATE_DIR
            && let Some(start) = raw_path.find(dir)
        {
            let split = raw_path[..start + dir.len()]
                .rfind(['/', '\\'])
                .map_or(0, |i| i + 1);
            return Self {
                crate_name: Some(Cow::Borrowed("fielderr-trace")),
                split_path: Some(FramePrefix {
                    prefix_kind: "FIELDERR",
                    prefix: raw_path[..split.saturating_sub(1)].to_owned(),
                    suffix: raw_path[split..].to_owned(),
                }),
                raw_path,
            };
        }

        Self {
            raw_path,
            crate_name: None,
            split_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sym: &str, path: &str, crate_name: Option<&'static str>, lineno: u32) -> Frame {
        Frame {
            sym_demangled: sym.to_owned(),
            frame_path: Some(FramePath {
                raw_path: path.to_owned(),
                crate_name: crate_name.map(Cow::Borrowed),
                split_path: None,
            }),
            lineno: Some(lineno),
        }
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("my_crate::module::function"), "function");
        assert_eq!(
            function_name("<my_crate::Type<T> as core::fmt::Display>::fmt"),
            "fmt"
        );
        assert_eq!(function_name("my_crate::run::{{closure}}"), "{{closure}}");
        assert_eq!(function_name("main"), "main");
    }

    #[test]
    fn test_frames_start_at_caller() {
        let location = Location::caller();
        let frames = vec![
            frame("backtrace::trace", "/b/backtrace.rs", Some("backtrace"), 1),
            frame("fielderr::new", "/f/construct.rs", None, 2),
            frame(
                "caller",
                &format!("/build/{}", location.file()),
                None,
                location.line(),
            ),
            frame("main", "/build/src/main.rs", None, 4),
        ];
        let backtrace = Backtrace::from_frames(frames, location, &StackFilter::DEFAULT).unwrap();
        assert_eq!(backtrace.total_omitted_frames, 2);
        assert_eq!(backtrace.entries.len(), 2);
        assert_eq!(
            backtrace.entries[0].render(false),
            format!("caller - /build/{}:{}", location.file(), location.line())
        );
    }

    #[test]
    fn test_frames_collapse_middle_crates() {
        let location = Location::caller();
        let frames = vec![
            frame("app::handler", "/app/src/handler.rs", None, 10),
            frame("std::a", "/rustc/std/a.rs", Some("std"), 1),
            frame("std::b", "/rustc/std/b.rs", Some("std"), 2),
            frame("std::c", "/rustc/std/c.rs", Some("std"), 3),
            frame("app::main", "/app/src/main.rs", None, 20),
            frame("std::d", "/rustc/std/d.rs", Some("std"), 4),
            frame("app::entry", "/app/src/entry.rs", None, 30),
            frame("std::rt", "/rustc/std/rt.rs", Some("std"), 5),
            frame("__libc_start_main_impl", "/libc/start.c", None, 6),
        ];
        let backtrace = Backtrace::from_frames(frames, location, &StackFilter::DEFAULT).unwrap();
        let rendered: Vec<String> = backtrace
            .entries
            .iter()
            .map(|entry| entry.render(false))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "handler - /app/src/handler.rs:10",
                "... omitted 3 frame(s) from crate 'std' ...",
                "main - /app/src/main.rs:20",
                "d - /rustc/std/d.rs:4",
                "entry - /app/src/entry.rs:30",
            ]
        );
        assert_eq!(backtrace.total_omitted_frames, 5);
    }

    #[test]
    fn test_frames_respect_max_entry_count() {
        let location = Location::caller();
        let frames = (0..10)
            .map(|i| frame("app::f", "/app/src/lib.rs", None, i))
            .collect();
        let filter = StackFilter {
            max_entry_count: 3,
            ..StackFilter::DEFAULT
        };
        let backtrace = Backtrace::from_frames(frames, location, &filter).unwrap();
        assert_eq!(backtrace.entries.len(), 3);
        assert_eq!(backtrace.total_omitted_frames, 7);
    }

    #[test]
    fn test_location_only_stack() {
        let location = Location::caller();
        let stack = Stack::location_only(location);
        assert!(stack.backtrace().is_none());
        assert_eq!(stack.frames(), vec![location.to_string()]);
        assert_eq!(stack.to_string(), location.to_string());
    }

    #[test]
    fn test_split_path_rendering() {
        let frame = Frame {
            sym_demangled: "indexmap::map::insert".to_owned(),
            frame_path: Some(FramePath {
                raw_path: "/home/u/.cargo/registry/src/x/indexmap-2.12.1/src/map.rs".to_owned(),
                crate_name: Some(Cow::Borrowed("indexmap")),
                split_path: Some(FramePrefix {
                    prefix_kind: "CARGO",
                    prefix: "/home/u/.cargo/registry/src/x".to_owned(),
                    suffix: "indexmap-2.12.1/src/map.rs".to_owned(),
                }),
            }),
            lineno: Some(7),
        };
        assert_eq!(frame.render(false), "insert - [..]/indexmap-2.12.1/src/map.rs:7");
        assert_eq!(
            frame.render(true),
            "insert - /home/u/.cargo/registry/src/x/indexmap-2.12.1/src/map.rs:7"
        );
    }
}
