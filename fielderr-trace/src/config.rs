//! Process-wide stack capture settings.
//!
//! Settings come from the environment unless a [`StackConfig`] has been
//! installed explicitly.
//!
//! # Environment Variables
//!
//! - `RUST_BACKTRACE=full` - Disables frame filtering and shows full paths
//! - `FIELDERR_STACK` - Comma-separated options:
//!   - `off` - Record only creation locations, never backtraces
//!   - `all` - Capture a backtrace for wrapping errors too
//!   - `full_paths` - Show full file paths in backtraces
//!
//! The environment is read once, the first time it is needed.

use std::{
    ffi::OsStr,
    fmt,
    panic::Location,
    sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::stack::Stack;

/// Which errors capture a full backtrace.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CaptureMode {
    /// No backtraces; every error only records its creation location.
    Off,
    /// Errors that start a chain capture a backtrace. Wrapping errors only
    /// record their location.
    #[default]
    Roots,
    /// Every error captures a backtrace.
    All,
}

/// Configuration for filtering frames from certain crates in a backtrace.
///
/// # Examples
///
/// ```rust
/// use fielderr_trace::StackFilter;
///
/// let filter = StackFilter {
///     // Hide framework frames in the middle
///     skipped_middle_crates: &["tokio", "hyper", "tower"],
///     // Show only the most relevant 10 frames
///     max_entry_count: 10,
///     ..StackFilter::DEFAULT
/// };
/// ```
#[derive(Copy, Clone, Debug)]
pub struct StackFilter {
    /// Crates whose frames are hidden when they appear at the beginning of
    /// a backtrace.
    ///
    /// Only consulted when the creation location could not be found among
    /// the captured frames.
    pub skipped_initial_crates: &'static [&'static str],
    /// Crates whose consecutive frames collapse into a single marker when
    /// they appear in the middle of a backtrace.
    pub skipped_middle_crates: &'static [&'static str],
    /// Crates whose frames are hidden when they appear at the end of a
    /// backtrace.
    pub skipped_final_crates: &'static [&'static str],
    /// Maximum number of entries to keep.
    pub max_entry_count: usize,
    /// Whether to show full file paths instead of shortened ones.
    pub show_full_path: bool,
}

impl StackFilter {
    /// Default filter settings.
    pub const DEFAULT: Self = Self {
        skipped_initial_crates: &[
            "backtrace",
            "fielderr",
            "fielderr-trace",
            "core",
            "std",
            "alloc",
        ],
        skipped_middle_crates: &["std", "core", "alloc", "tokio"],
        skipped_final_crates: &["std", "core", "alloc", "tokio"],
        max_entry_count: 20,
        show_full_path: false,
    };

    /// Keeps every frame.
    pub const NONE: Self = Self {
        skipped_initial_crates: &[],
        skipped_middle_crates: &[],
        skipped_final_crates: &[],
        max_entry_count: usize::MAX,
        show_full_path: true,
    };
}

impl Default for StackFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Stack capture settings.
#[derive(Copy, Clone, Debug)]
pub struct StackConfig {
    /// How captured backtraces are filtered.
    pub filter: StackFilter,
    /// Which errors capture a backtrace.
    pub capture: CaptureMode,
}

impl StackConfig {
    /// Capture backtraces for chain roots with the default filter.
    pub const DEFAULT: Self = Self {
        filter: StackFilter::DEFAULT,
        capture: CaptureMode::Roots,
    };

    /// The settings derived from `RUST_BACKTRACE` and `FIELDERR_STACK`.
    pub fn from_env() -> Self {
        static FROM_ENV: OnceLock<StackConfig> = OnceLock::new();

        *FROM_ENV.get_or_init(|| {
            EnvOptions::parse(
                std::env::var_os("RUST_BACKTRACE").as_deref(),
                std::env::var_os("FIELDERR_STACK").as_deref(),
            )
            .into_config()
        })
    }

    /// The settings currently in effect.
    ///
    /// This is the installed configuration if there is one, and
    /// [`StackConfig::from_env`] otherwise.
    pub fn current() -> Self {
        match *INSTALLED.read() {
            Some(config) => config,
            None => Self::from_env(),
        }
    }

    /// Installs these settings globally.
    ///
    /// Fails if settings were installed before; the error carries the
    /// settings that were rejected. See also [`replace`](Self::replace).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fielderr_trace::{CaptureMode, StackConfig};
    ///
    /// let config = StackConfig {
    ///     capture: CaptureMode::Off,
    ///     ..StackConfig::DEFAULT
    /// };
    /// config.install().expect("stack config installed twice");
    ///
    /// StackConfig::DEFAULT.install().unwrap_err();
    /// ```
    pub fn install(self) -> Result<(), ConfigAlreadyInstalledError> {
        let mut installed = INSTALLED.write();
        if installed.is_some() {
            return Err(ConfigAlreadyInstalledError(self));
        }
        *installed = Some(self);
        Ok(())
    }

    /// Installs these settings globally, returning the previously installed
    /// ones.
    pub fn replace(self) -> Option<StackConfig> {
        INSTALLED.write().replace(self)
    }

    /// The stack recorded for an error that starts a chain.
    pub fn root_stack(&self, location: &'static Location<'static>) -> Stack {
        match self.capture {
            CaptureMode::Off => Stack::location_only(location),
            CaptureMode::Roots | CaptureMode::All => Stack::capture(location, &self.filter),
        }
    }

    /// The stack recorded for an error that wraps another traced error.
    pub fn wrap_stack(&self, location: &'static Location<'static>) -> Stack {
        match self.capture {
            CaptureMode::All => Stack::capture(location, &self.filter),
            CaptureMode::Off | CaptureMode::Roots => Stack::location_only(location),
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Error returned by [`StackConfig::install`] when settings are already
/// installed.
///
/// Contains the settings that were attempted to be installed.
#[derive(Copy, Clone)]
pub struct ConfigAlreadyInstalledError(pub StackConfig);

impl fmt::Debug for ConfigAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigAlreadyInstalledError").finish()
    }
}

impl fmt::Display for ConfigAlreadyInstalledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stack config is already installed globally")
    }
}

impl std::error::Error for ConfigAlreadyInstalledError {}

static INSTALLED: ConfigLock = ConfigLock::new();

#[repr(transparent)]
struct ConfigLock(RwLock<Option<StackConfig>>);

impl ConfigLock {
    const fn new() -> Self {
        Self(RwLock::new(None))
    }

    // The guarded value is plain data, so a poisoned lock is still usable.
    fn read(&'static self) -> RwLockReadGuard<'static, Option<StackConfig>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&'static self) -> RwLockWriteGuard<'static, Option<StackConfig>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct EnvOptions {
    rust_backtrace_full: bool,
    capture: CaptureMode,
    show_full_path: bool,
}

impl EnvOptions {
    fn parse(rust_backtrace: Option<&OsStr>, fielderr_stack: Option<&OsStr>) -> Self {
        let rust_backtrace_full = rust_backtrace.is_some_and(|var| var == "full");
        let mut show_full_path = rust_backtrace_full;
        let mut capture = CaptureMode::Roots;
        if let Some(var) = fielderr_stack {
            for v in var.to_string_lossy().split(',') {
                let v = v.trim();
                if v.eq_ignore_ascii_case("off") {
                    capture = CaptureMode::Off;
                } else if v.eq_ignore_ascii_case("all") {
                    capture = CaptureMode::All;
                } else if v.eq_ignore_ascii_case("full_paths") {
                    show_full_path = true;
                }
            }
        }
        Self {
            rust_backtrace_full,
            capture,
            show_full_path,
        }
    }

    fn into_config(self) -> StackConfig {
        let filter = if self.rust_backtrace_full {
            StackFilter::NONE
        } else {
            StackFilter::DEFAULT
        };
        StackConfig {
            filter: StackFilter {
                show_full_path: self.show_full_path,
                ..filter
            },
            capture: self.capture,
        }
    }
}
