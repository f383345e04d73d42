//! Commonly used items for convenient importing.
//!
//! ```rust
//! use fielderr::prelude::*;
//!
//! fn divide(a: i32, b: i32) -> Result<i32, Error> {
//!     if b == 0 {
//!         bail!("cannot divide %d by zero", a);
//!     }
//!     Ok(a / b)
//! }
//!
//! let err = divide(1, 0).unwrap_err();
//! assert_eq!(err.to_string(), "cannot divide 1 by zero");
//! ```

pub use crate::{
    Error, List, SafeList, SafeSet, Set, Value, bail, compat::IntoFielderr, err, errorf, wrap,
    wrapf,
};
