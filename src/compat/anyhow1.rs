//! Conversions from [`anyhow`] 1.x errors.
//!
//! Requires the `compat-anyhow1` feature flag.
//!
//! ```
//! use fielderr::compat::IntoFielderr;
//!
//! fn legacy() -> anyhow::Result<()> {
//!     anyhow::bail!("legacy failure");
//! }
//!
//! let err = legacy().into_fielderr().unwrap_err();
//! assert_eq!(err.to_string(), "legacy failure");
//! assert!(fielderr::check(&err));
//! ```
//!
//! Converting back needs no helper, since [`Error`] implements
//! [`std::error::Error`]:
//!
//! ```
//! fn modern() -> fielderr::Result<()> {
//!     Err(fielderr::new("modern failure", &[]))
//! }
//!
//! fn legacy() -> anyhow::Result<()> {
//!     modern()?;
//!     Ok(())
//! }
//!
//! let err = legacy().unwrap_err();
//! assert!(err.downcast_ref::<fielderr::Error>().is_some());
//! ```

use fielderr_trace::BoxedError;

use super::IntoFielderr;
use crate::Error;

impl IntoFielderr for anyhow::Error {
    type Output = Error;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        match self.downcast::<Error>() {
            Ok(err) => err,
            Err(other) => Error::from(BoxedError::from(other)),
        }
    }
}

impl<T> IntoFielderr for anyhow::Result<T> {
    type Output = Result<T, Error>;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(err.into_fielderr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_error() {
        let original = crate::new("inner", &[&"k", &1]);
        let converted = anyhow::Error::new(original.clone()).into_fielderr();
        assert!(converted.traced().ptr_eq(original.traced()));
    }

    #[test]
    fn test_foreign_chain_is_kept() {
        let err = anyhow::anyhow!("root cause").context("outer context");
        let converted = err.into_fielderr();
        assert_eq!(converted.to_string(), "outer context: root cause");
        assert!(crate::contains(&converted, "root cause"));
        assert!(crate::check(&converted));
    }
}
