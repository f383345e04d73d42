//! Conversions from boxed error trait objects.
//!
//! ```
//! use std::error::Error as StdError;
//!
//! use fielderr::compat::IntoFielderr;
//!
//! let boxed: Box<dyn StdError + Send + Sync> = "not a number".parse::<i32>().unwrap_err().into();
//! let err = boxed.into_fielderr();
//! assert_eq!(err.to_string(), "invalid digit found in string");
//!
//! // A boxed `Error` comes back unchanged.
//! let original = fielderr::new("boxed", &[]);
//! let boxed: Box<dyn StdError + Send + Sync> = Box::new(original.clone());
//! assert!(boxed.into_fielderr().traced().ptr_eq(original.traced()));
//! ```

use fielderr_trace::BoxedError;

use super::IntoFielderr;
use crate::Error;

impl IntoFielderr for BoxedError {
    type Output = Error;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        Error::from(self)
    }
}

impl<T> IntoFielderr for Result<T, BoxedError> {
    type Output = Result<T, Error>;

    #[track_caller]
    fn into_fielderr(self) -> Self::Output {
        match self {
            Ok(value) => Ok(value),
            Err(boxed) => Err(Error::from(boxed)),
        }
    }
}
