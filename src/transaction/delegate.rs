//! Forwarding shared by every handle type.
//!
//! Handles hold an optional shared implementation. [`Delegate::forward`] is
//! the only place that checks for a missing implementation, and [`raise`]
//! is the only place an explicit-error operation becomes a `Result`.

use std::fmt;
use std::sync::Arc;

use crate::transaction::error::{ErrorReport, TransactionResult};

/// Optional shared implementation behind a handle.
pub(crate) struct Delegate<I: ?Sized> {
    inner: Option<Arc<I>>,
}

impl<I: ?Sized> Delegate<I> {
    pub(crate) fn new(inner: Option<Arc<I>>) -> Self {
        Self { inner }
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.inner.is_some()
    }

    pub(crate) fn get(&self) -> Option<&Arc<I>> {
        self.inner.as_ref()
    }

    /// Check whether two delegates share the same implementation.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Reset `err`, then hand the call to the implementation.
    ///
    /// Without an implementation, `err` is set to the not-usable failure and
    /// the default result is returned.
    pub(crate) fn forward<T, F>(&self, op: &'static str, err: &mut ErrorReport, call: F) -> T
    where
        T: Default,
        F: FnOnce(&I, &mut ErrorReport) -> T,
    {
        err.reset();

        match self.inner.as_deref() {
            Some(inner) => {
                tracing::trace!(op, "forwarding to implementation");
                call(inner, err)
            }
            None => {
                tracing::debug!(op, "operation on an instance without implementation");
                *err = ErrorReport::not_usable();
                T::default()
            }
        }
    }
}

impl<I: ?Sized> Clone for Delegate<I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I: ?Sized> Default for Delegate<I> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<I: ?Sized> fmt::Debug for Delegate<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("usable", &self.is_usable())
            .finish()
    }
}

/// Run an explicit-error operation and raise its failure, if any.
pub(crate) fn raise<T, F>(call: F) -> TransactionResult<T>
where
    F: FnOnce(&mut ErrorReport) -> T,
{
    let mut err = ErrorReport::success();
    let value = call(&mut err);
    err.into_result().map(|()| value)
}
