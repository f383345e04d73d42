//! Marker types selecting how error collections share their storage.
//!
//! - [`Local`] collections use `Rc<RefCell<_>>`. They are neither [`Send`]
//!   nor [`Sync`], so the compiler keeps them on one thread.
//! - [`SendSync`] collections use `Arc<Mutex<_>>` and can be shared between
//!   threads; every operation takes the lock.
//!
//! ```
//! use fielderr::{List, SafeList};
//!
//! let local = List::new();
//! let shared = SafeList::new();
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| shared.new_error("from worker", &[]));
//! });
//! assert_eq!(shared.len(), 1);
//! # let _ = local;
//! ```

use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    sync::{Arc, Mutex, PoisonError},
};

/// Marker for collections confined to a single thread.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Local;

/// Marker for collections that can be shared between threads.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct SendSync;

mod sealed_thread_safety {
    use super::*;

    pub trait Sealed: 'static {}

    impl Sealed for Local {}
    impl Sealed for SendSync {}
}

/// The storage strategy of a collection, implemented by [`Local`] and
/// [`SendSync`].
///
/// This trait is sealed.
pub trait ThreadSafety:
    sealed_thread_safety::Sealed + Copy + Default + fmt::Debug
{
    /// Shared, mutable storage for a `V`.
    #[doc(hidden)]
    type Shared<V: 'static>;

    /// Wraps `value` into shared storage.
    #[doc(hidden)]
    fn share<V: 'static>(value: V) -> Self::Shared<V>;

    /// Returns another handle to the same storage.
    #[doc(hidden)]
    fn clone_shared<V: 'static>(shared: &Self::Shared<V>) -> Self::Shared<V>;

    /// Runs `f` with exclusive access to the stored value.
    ///
    /// `f` must not reach the same storage again.
    #[doc(hidden)]
    fn with<V: 'static, R>(shared: &Self::Shared<V>, f: impl FnOnce(&mut V) -> R) -> R;
}

impl ThreadSafety for Local {
    type Shared<V: 'static> = Rc<RefCell<V>>;

    fn share<V: 'static>(value: V) -> Self::Shared<V> {
        Rc::new(RefCell::new(value))
    }

    fn clone_shared<V: 'static>(shared: &Self::Shared<V>) -> Self::Shared<V> {
        Rc::clone(shared)
    }

    fn with<V: 'static, R>(shared: &Self::Shared<V>, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut shared.borrow_mut())
    }
}

impl ThreadSafety for SendSync {
    type Shared<V: 'static> = Arc<Mutex<V>>;

    fn share<V: 'static>(value: V) -> Self::Shared<V> {
        Arc::new(Mutex::new(value))
    }

    fn clone_shared<V: 'static>(shared: &Self::Shared<V>) -> Self::Shared<V> {
        Arc::clone(shared)
    }

    fn with<V: 'static, R>(shared: &Self::Shared<V>, f: impl FnOnce(&mut V) -> R) -> R {
        // Members are only pushed, cloned or cleared under the lock, so a
        // poisoned lock still guards consistent data.
        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
