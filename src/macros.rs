/// Creates a new [`Error`](crate::Error) from a message and fields.
///
/// This is [`new`](crate::new) without the slice boilerplate: every
/// argument after the message is a field.
///
/// # Examples
///
/// ```
/// use fielderr::err;
///
/// let user_id = 42;
/// let err = err!("user not found", "user_id", user_id);
/// assert_eq!(err.to_string(), "user not found user_id=42");
/// ```
#[macro_export]
macro_rules! err {
    ($msg:expr $(, $field:expr)* $(,)?) => {
        $crate::new($msg, &[$(&$field as &dyn $crate::Value),*])
    };
}

/// Creates a new [`Error`](crate::Error) from a format string and
/// arguments; see [`errorf`](crate::errorf).
///
/// # Examples
///
/// ```
/// use fielderr::errorf;
///
/// let err = errorf!("port %d is in use", 8080, "host", "localhost");
/// assert_eq!(err.to_string(), "port 8080 is in use host=localhost");
/// ```
#[macro_export]
macro_rules! errorf {
    ($format:expr $(, $arg:expr)* $(,)?) => {
        $crate::errorf($format, &[$(&$arg as &dyn $crate::Value),*])
    };
}

/// Wraps an error with a message and fields; see [`wrap`](crate::wrap).
///
/// # Examples
///
/// ```
/// use fielderr::{err, wrap};
///
/// let root = err!("timeout");
/// let err = wrap!(root, "fetching page", "attempt", 3);
/// assert_eq!(err.to_string(), "fetching page attempt=3: timeout");
/// ```
#[macro_export]
macro_rules! wrap {
    ($err:expr, $msg:expr $(, $field:expr)* $(,)?) => {
        $crate::wrap($err, $msg, &[$(&$field as &dyn $crate::Value),*])
    };
}

/// Wraps an error with a formatted message; see [`wrapf`](crate::wrapf).
///
/// # Examples
///
/// ```
/// use fielderr::{err, wrapf};
///
/// let root = err!("connection reset");
/// let err = wrapf!(root, "reading %s", "body", "bytes", 512);
/// assert_eq!(err.to_string(), "reading body bytes=512: connection reset");
/// ```
#[macro_export]
macro_rules! wrapf {
    ($err:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $crate::wrapf($err, $format, &[$(&$arg as &dyn $crate::Value),*])
    };
}

/// Return early with an error.
///
/// The arguments are the same as for [`errorf!`], and the error is
/// converted with [`Into`] so the function may return any error type that
/// [`Error`](crate::Error) converts into.
///
/// This is equivalent to writing `return Err(errorf!(...).into());`
///
/// # Examples
///
/// ```
/// use fielderr::bail;
///
/// fn check_age(age: i32) -> fielderr::Result<i32> {
///     if age < 0 {
///         bail!("age must be non-negative, got %d", age);
///     }
///     Ok(age)
/// }
///
/// assert_eq!(check_age(-1).unwrap_err().to_string(), "age must be non-negative, got -1");
/// ```
#[macro_export]
macro_rules! bail {
    ($($args:tt)*) => {
        return $crate::__private::Err($crate::errorf!($($args)*).into())
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_record_call_site() {
        let line = line!() + 1;
        let err = crate::err!("at call site", "k", 1);
        assert_eq!(err.location().line(), line);
        assert_eq!(err.location().file(), file!());
    }

    #[test]
    fn test_macro_forms() {
        assert_eq!(crate::err!("plain").to_string(), "plain");
        assert_eq!(crate::errorf!("%s=%d", "a", 1,).to_string(), "a=1");
        let root = crate::err!("root");
        assert_eq!(crate::wrap!(root.clone(), "outer").to_string(), "outer: root");
        assert_eq!(
            crate::wrapf!(root, "step %d", 2, "k", "v").to_string(),
            "step 2 k=v: root"
        );
    }

    #[test]
    fn test_bail() {
        fn fail(fail: bool) -> crate::Result<()> {
            if fail {
                crate::bail!("failed with code %d", 3);
            }
            Ok(())
        }

        assert!(fail(false).is_ok());
        assert_eq!(fail(true).unwrap_err().to_string(), "failed with code 3");
    }
}
