//! Client-side transaction handle.
//!
//! A [`Transaction`] is a cheap, cloneable reference to a remote session.
//! Every operation exists in two forms:
//! - `op()` returns a [`TransactionResult`]
//! - `op_with(&mut err)` fills an [`ErrorReport`] and returns the plain value
//!
//! Both go through the same forwarding path, so they behave identically
//! apart from how a failure is surfaced.

use std::fmt;
use std::sync::Arc;

use crate::transaction::delegate::{raise, Delegate};
use crate::transaction::error::{ErrorReport, TransactionResult};
use crate::transaction::session::{SharedSession, TransactionSession};
use crate::transaction::state::TransactionState;

/// Handle to a transaction running against the cluster.
///
/// Clones share the same session and observe the same state transitions.
/// A handle built without a session is unusable: every operation reports
/// the not-usable failure. Usability is fixed at construction; `close`,
/// `commit` and `rollback` keep forwarding to the session afterwards.
///
/// A handle is exactly as thread-safe as its session.
#[derive(Clone, Default)]
pub struct Transaction {
    session: Delegate<dyn TransactionSession>,
}

impl Transaction {
    /// Create a handle from an optional session.
    pub fn new(session: Option<SharedSession>) -> Self {
        Self {
            session: Delegate::new(session),
        }
    }

    /// Create a handle for a live session.
    pub fn from_session(session: SharedSession) -> Self {
        Self::new(Some(session))
    }

    /// Create an unusable handle.
    pub fn unusable() -> Self {
        Self::default()
    }

    /// Check whether the handle references a session.
    pub fn is_usable(&self) -> bool {
        self.session.is_usable()
    }

    /// Check whether two handles reference the same session.
    pub fn same_session(&self, other: &Transaction) -> bool {
        self.session.same_as(&other.session)
    }

    /// The referenced session.
    pub fn session(&self) -> Option<&SharedSession> {
        self.session.get()
    }

    // ==================== Transaction Control ====================

    pub fn commit(&self) -> TransactionResult<()> {
        raise(|err| self.commit_with(err))
    }

    pub fn commit_with(&self, err: &mut ErrorReport) {
        self.session.forward("commit", err, |s, err| s.commit(err))
    }

    pub fn rollback(&self) -> TransactionResult<()> {
        raise(|err| self.rollback_with(err))
    }

    pub fn rollback_with(&self, err: &mut ErrorReport) {
        self.session.forward("rollback", err, |s, err| s.rollback(err))
    }

    /// Ask the session to release its remote resources.
    ///
    /// The handle stays usable afterwards.
    pub fn close(&self) -> TransactionResult<()> {
        raise(|err| self.close_with(err))
    }

    pub fn close_with(&self, err: &mut ErrorReport) {
        self.session.forward("close", err, |s, err| s.close(err))
    }

    /// Mark the transaction so that it can only be rolled back.
    pub fn set_rollback_only(&self) -> TransactionResult<()> {
        raise(|err| self.set_rollback_only_with(err))
    }

    pub fn set_rollback_only_with(&self, err: &mut ErrorReport) {
        self.session
            .forward("set_rollback_only", err, |s, err| s.set_rollback_only(err))
    }

    // ==================== State ====================

    pub fn is_rollback_only(&self) -> TransactionResult<bool> {
        raise(|err| self.is_rollback_only_with(err))
    }

    /// Returns `false` when the handle is unusable.
    pub fn is_rollback_only_with(&self, err: &mut ErrorReport) -> bool {
        self.session
            .forward("is_rollback_only", err, |s, err| s.is_rollback_only(err))
    }

    pub fn state(&self) -> TransactionResult<TransactionState> {
        raise(|err| self.state_with(err))
    }

    /// Returns [`TransactionState::Unknown`] when the handle is unusable.
    pub fn state_with(&self, err: &mut ErrorReport) -> TransactionState {
        self.session.forward("state", err, |s, err| s.state(err))
    }
}

impl<S: TransactionSession + 'static> From<Arc<S>> for Transaction {
    fn from(session: Arc<S>) -> Self {
        Self::from_session(session)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("usable", &self.is_usable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::error::{ErrorKind, NOT_USABLE_MESSAGE};
    use parking_lot::Mutex;

    /// Session double that records calls and replays a scripted outcome.
    #[derive(Default)]
    struct ScriptedSession {
        calls: Mutex<Vec<&'static str>>,
        failure: Mutex<Option<ErrorReport>>,
        rollback_only: bool,
        state: TransactionState,
    }

    impl ScriptedSession {
        fn with_state(state: TransactionState) -> Arc<Self> {
            Arc::new(Self {
                state,
                ..Default::default()
            })
        }

        fn failing(failure: ErrorReport) -> Arc<Self> {
            Arc::new(Self {
                failure: Mutex::new(Some(failure)),
                rollback_only: true,
                state: TransactionState::Committed,
                ..Default::default()
            })
        }

        fn record(&self, op: &'static str, err: &mut ErrorReport) {
            self.calls.lock().push(op);
            if let Some(failure) = self.failure.lock().clone() {
                *err = failure;
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl TransactionSession for ScriptedSession {
        fn commit(&self, err: &mut ErrorReport) {
            self.record("commit", err);
        }

        fn rollback(&self, err: &mut ErrorReport) {
            self.record("rollback", err);
        }

        fn close(&self, err: &mut ErrorReport) {
            self.record("close", err);
        }

        fn set_rollback_only(&self, err: &mut ErrorReport) {
            self.record("set_rollback_only", err);
        }

        fn is_rollback_only(&self, err: &mut ErrorReport) -> bool {
            self.record("is_rollback_only", err);
            self.rollback_only
        }

        fn state(&self, err: &mut ErrorReport) -> TransactionState {
            self.record("state", err);
            self.state
        }
    }

    fn stale_report() -> ErrorReport {
        ErrorReport::new(ErrorKind::TxHeuristic, "left over from a previous call")
    }

    #[test]
    fn test_unusable_error_report_forms() {
        let tx = Transaction::default();
        assert!(!tx.is_usable());

        let mut err = stale_report();
        tx.commit_with(&mut err);
        assert_eq!(err, ErrorReport::not_usable());

        let mut err = stale_report();
        tx.rollback_with(&mut err);
        assert_eq!(err, ErrorReport::not_usable());

        let mut err = stale_report();
        tx.close_with(&mut err);
        assert_eq!(err, ErrorReport::not_usable());

        let mut err = stale_report();
        tx.set_rollback_only_with(&mut err);
        assert_eq!(err, ErrorReport::not_usable());

        let mut err = stale_report();
        assert!(!tx.is_rollback_only_with(&mut err));
        assert_eq!(err, ErrorReport::not_usable());

        let mut err = stale_report();
        assert_eq!(tx.state_with(&mut err), TransactionState::Unknown);
        assert_eq!(err, ErrorReport::not_usable());
    }

    #[test]
    fn test_unusable_raising_forms() {
        let tx = Transaction::unusable();
        let errors = [
            tx.commit().unwrap_err(),
            tx.rollback().unwrap_err(),
            tx.close().unwrap_err(),
            tx.set_rollback_only().unwrap_err(),
            tx.is_rollback_only().unwrap_err(),
            tx.state().unwrap_err(),
        ];

        for err in errors {
            assert!(err.is_not_usable());
            assert_eq!(err.kind(), ErrorKind::Generic);
            assert_eq!(err.message(), NOT_USABLE_MESSAGE);
            assert_eq!(ErrorReport::from(err), ErrorReport::not_usable());
        }
    }

    #[test]
    fn test_active_state() {
        let session = ScriptedSession::with_state(TransactionState::Active);
        let tx = Transaction::from(session.clone());

        assert_eq!(tx.state().unwrap(), TransactionState::Active);

        let mut err = stale_report();
        assert_eq!(tx.state_with(&mut err), TransactionState::Active);
        assert!(err.is_success());
        assert_eq!(session.calls(), vec!["state", "state"]);
    }

    #[test]
    fn test_success_mirrors_session() {
        let session = ScriptedSession::with_state(TransactionState::MarkedRollbackOnly);
        let tx = Transaction::from(session.clone());

        tx.set_rollback_only().unwrap();
        assert!(!tx.is_rollback_only().unwrap());
        tx.commit().unwrap();
        tx.rollback().unwrap();
        tx.close().unwrap();

        assert_eq!(
            session.calls(),
            vec!["set_rollback_only", "is_rollback_only", "commit", "rollback", "close"]
        );
    }

    #[test]
    fn test_delegated_failure_passes_through() {
        let failure = ErrorReport::new(ErrorKind::IllegalState, "transaction already committed");
        let session = ScriptedSession::failing(failure.clone());
        let tx = Transaction::from(session.clone());

        let mut err = ErrorReport::success();
        tx.rollback_with(&mut err);
        assert_eq!(err, failure);

        let raised = tx.rollback().unwrap_err();
        assert!(!raised.is_not_usable());
        assert_eq!(raised.kind(), ErrorKind::IllegalState);
        assert_eq!(raised.message(), "transaction already committed");

        assert_eq!(session.calls(), vec!["rollback", "rollback"]);
    }

    #[test]
    fn test_value_survives_failure_in_error_report_form() {
        let failure = ErrorReport::new(ErrorKind::Generic, "state lookup failed");
        let session = ScriptedSession::failing(failure.clone());
        let tx = Transaction::from(session);

        let mut err = ErrorReport::success();
        assert!(tx.is_rollback_only_with(&mut err));
        assert_eq!(err, failure);

        let mut err = ErrorReport::success();
        assert_eq!(tx.state_with(&mut err), TransactionState::Committed);
        assert_eq!(err, failure);

        assert_eq!(tx.state().unwrap_err().message(), "state lookup failed");
    }

    #[test]
    fn test_clone_shares_session() {
        let session = ScriptedSession::with_state(TransactionState::Active);
        let tx = Transaction::from(session.clone());
        let copy = tx.clone();

        assert!(tx.same_session(&copy));
        assert_eq!(copy.state().unwrap(), tx.state().unwrap());

        copy.commit().unwrap();
        tx.commit().unwrap();
        assert_eq!(session.calls(), vec!["state", "state", "commit", "commit"]);

        let other = Transaction::from(ScriptedSession::with_state(TransactionState::Active));
        assert!(!tx.same_session(&other));
        assert!(!Transaction::unusable().same_session(&Transaction::unusable()));
    }

    #[test]
    fn test_repeated_calls_are_delegated() {
        let session = ScriptedSession::with_state(TransactionState::Active);
        let tx = Transaction::from(session.clone());

        tx.commit().unwrap();
        tx.commit().unwrap();
        tx.rollback().unwrap();
        tx.rollback().unwrap();
        tx.close().unwrap();
        tx.close().unwrap();

        assert_eq!(
            session.calls(),
            vec!["commit", "commit", "rollback", "rollback", "close", "close"]
        );
    }

    #[test]
    fn test_close_keeps_handle_usable() {
        let session = ScriptedSession::with_state(TransactionState::RolledBack);
        let tx = Transaction::from(session.clone());

        tx.close().unwrap();
        assert!(tx.is_usable());
        assert_eq!(tx.state().unwrap(), TransactionState::RolledBack);
        assert_eq!(session.calls(), vec!["close", "state"]);
    }

    #[test]
    fn test_dropping_handles_releases_session() {
        let session = ScriptedSession::with_state(TransactionState::Active);
        let tx = Transaction::from(session.clone());
        let copy = tx.clone();
        assert_eq!(Arc::strong_count(&session), 3);

        drop(tx);
        assert_eq!(Arc::strong_count(&session), 2);
        drop(copy);
        assert_eq!(Arc::strong_count(&session), 1);
        assert!(session.calls().is_empty());
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(
            format!("{:?}", Transaction::unusable()),
            "Transaction { usable: false }"
        );
    }
}
