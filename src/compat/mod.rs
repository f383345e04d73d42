//! Conversions from other error handling libraries.
//!
//! Errors from other libraries are turned into an [`Error`] with
//! [`IntoFielderr::into_fielderr`]. The converted error keeps the original
//! as its source and records the location of the conversion. An [`Error`]
//! that was boxed or stored inside another library's error is recovered
//! as-is.
//!
//! The other direction needs no help: [`Error`] implements
//! [`std::error::Error`], so `?` converts it into a boxed error, an
//! [`anyhow::Error`] or an [`eyre::Report`].
//!
//! # Available Integrations
//!
//! - [`boxed_error`] - `Box<dyn Error + Send + Sync>`
//! - `anyhow1` - `anyhow` 1.x (requires the `compat-anyhow1` feature flag)
//! - `eyre06` - `eyre` 0.6.x (requires the `compat-eyre06` feature flag)
//!
//! [`anyhow::Error`]: https://docs.rs/anyhow/1/anyhow/struct.Error.html
//! [`eyre::Report`]: https://docs.rs/eyre/0.6/eyre/struct.Report.html
//!
//! # Example
//!
//! ```
//! use fielderr::compat::IntoFielderr;
//!
//! fn legacy() -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
//!     Ok("8080".parse::<u16>()?)
//! }
//!
//! fn port() -> fielderr::Result<u16> {
//!     legacy().into_fielderr()
//! }
//!
//! assert_eq!(port().unwrap(), 8080);
//! ```

use crate::Error;

/// Converts errors of other libraries into an [`Error`].
///
/// Implemented both for the error types themselves and for `Result`s
/// carrying them.
pub trait IntoFielderr {
    /// The type produced by the conversion: [`Error`] for errors, and
    /// `Result<T, Error>` for results.
    type Output;

    /// Performs the conversion.
    #[track_caller]
    fn into_fielderr(self) -> Self::Output;
}

impl IntoFielderr for Error {
    type Output = Error;

    fn into_fielderr(self) -> Self::Output {
        self
    }
}

pub mod boxed_error;

#[cfg(feature = "compat-anyhow1")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-anyhow1")))]
pub mod anyhow1;

#[cfg(feature = "compat-eyre06")]
#[cfg_attr(docsrs, doc(cfg(feature = "compat-eyre06")))]
pub mod eyre06;
