//! Conversions from [`eyre`] 0.6.x reports.
//!
//! Requires the `compat-eyre06` feature flag.
//!
//! ```
//! use fielderr::compat::IntoFielderr;
//!
//! fn legacy() -> eyre::Result<()> {
//!     eyre::bail!("legacy failure");
//! }
//!
//! let err = legacy().into_fielderr().unwrap_err();
//! assert_eq!(err.to_string(), "legacy failure");
//! ```

use fielderr_trace::BoxedError;

use super::IntoFielderr;
use crate::Error;

impl IntoFielderr for eyre::Report {
    type Output = Error;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        match self.downcast::<Error>() {
            Ok(err) => err,
            Err(other) => Error::from(BoxedError::from(other)),
        }
    }
}

impl<T> IntoFielderr for eyre::Result<T> {
    type Output = Result<T, Error>;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        match self {
            Ok(value) => Ok(value),
            Err(report) => Err(report.into_fielderr()),
        }
    }
}
