//! Interfaces consumed from the protocol layer.
//!
//! The handles in this crate never talk to the cluster themselves. They
//! forward to implementations of these traits, which own the real state
//! machine and the network plumbing.
//!
//! Implementations report failure only through the `err` argument: they
//! must not panic across this boundary and must leave `err` either
//! untouched (success) or set to a failure before returning.

use std::sync::Arc;

use crate::transaction::config::TxOptions;
use crate::transaction::error::ErrorReport;
use crate::transaction::metrics::TransactionMetrics;
use crate::transaction::state::TransactionState;

/// A live remote transaction session.
///
/// Shared between every copy of a [`Transaction`](crate::transaction::Transaction)
/// handle. Handles add no synchronization of their own, so ordering of
/// concurrent calls (commit against rollback, for example) is the
/// implementation's contract.
pub trait TransactionSession: Send + Sync {
    fn commit(&self, err: &mut ErrorReport);

    fn rollback(&self, err: &mut ErrorReport);

    /// Release remote resources held by the session.
    fn close(&self, err: &mut ErrorReport);

    fn set_rollback_only(&self, err: &mut ErrorReport);

    fn is_rollback_only(&self, err: &mut ErrorReport) -> bool;

    fn state(&self, err: &mut ErrorReport) -> TransactionState;
}

/// Shared reference to a session.
pub type SharedSession = Arc<dyn TransactionSession>;

/// The factory side of the protocol layer: starts sessions and reports
/// cluster-wide transaction metrics.
pub trait TransactionsBackend: Send + Sync {
    /// Start a new session for the calling thread.
    ///
    /// Returns `None` when `err` has been set.
    fn tx_start(&self, options: &TxOptions, err: &mut ErrorReport) -> Option<SharedSession>;

    /// The session bound to the calling thread, if any.
    fn current(&self, err: &mut ErrorReport) -> Option<SharedSession>;

    fn metrics(&self, err: &mut ErrorReport) -> TransactionMetrics;

    fn reset_metrics(&self, err: &mut ErrorReport);
}
