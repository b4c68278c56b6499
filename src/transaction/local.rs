//! In-process backend.
//!
//! [`LocalBackend`] runs the transaction state machine without a cluster.
//! It binds at most one unfinished transaction to each thread, tracks
//! metrics, and gives handles a real session to drive in tests and
//! single-process deployments.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use ulid::Ulid;

use crate::transaction::config::TxOptions;
use crate::transaction::error::{ErrorKind, ErrorReport};
use crate::transaction::metrics::TransactionMetrics;
use crate::transaction::session::{SharedSession, TransactionSession, TransactionsBackend};
use crate::transaction::state::TransactionState;

/// Backend that keeps all transactions in the current process.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone, Default)]
pub struct LocalBackend {
    inner: Arc<LocalBackendInner>,
}

#[derive(Default)]
struct LocalBackendInner {
    /// Unfinished sessions by the thread that started them.
    bound: RwLock<HashMap<ThreadId, Arc<LocalSession>>>,
    metrics: Mutex<TransactionMetrics>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of unfinished transactions.
    pub fn active_count(&self) -> usize {
        self.inner.bound.read().len()
    }

    /// The unfinished session started by the calling thread.
    pub fn current_session(&self) -> Option<Arc<LocalSession>> {
        self.inner.bound.read().get(&thread::current().id()).cloned()
    }
}

impl TransactionsBackend for LocalBackend {
    fn tx_start(&self, options: &TxOptions, err: &mut ErrorReport) -> Option<SharedSession> {
        let thread = thread::current().id();
        let mut bound = self.inner.bound.write();

        if let Some(existing) = bound.get(&thread) {
            err.set(
                ErrorKind::IllegalState,
                format!(
                    "a transaction has already been started by the current thread: {}",
                    existing.id()
                ),
            );
            return None;
        }

        let session = Arc::new(LocalSession::new(
            *options,
            thread,
            Arc::downgrade(&self.inner),
        ));
        bound.insert(thread, session.clone());

        tracing::debug!(tx_id = %session.id(), "transaction started");
        Some(session)
    }

    fn current(&self, _err: &mut ErrorReport) -> Option<SharedSession> {
        self.current_session().map(|s| s as SharedSession)
    }

    fn metrics(&self, _err: &mut ErrorReport) -> TransactionMetrics {
        self.inner.metrics.lock().clone()
    }

    fn reset_metrics(&self, _err: &mut ErrorReport) {
        *self.inner.metrics.lock() = TransactionMetrics::default();
    }
}

impl fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBackend")
            .field("active_count", &self.active_count())
            .finish()
    }
}

#[derive(Debug)]
struct SessionState {
    state: TransactionState,
    closed: bool,
}

/// A transaction session owned by a [`LocalBackend`].
pub struct LocalSession {
    id: Ulid,
    options: TxOptions,
    started_at: DateTime<Utc>,
    started: Instant,
    thread: ThreadId,
    state: Mutex<SessionState>,
    backend: Weak<LocalBackendInner>,
}

impl LocalSession {
    fn new(options: TxOptions, thread: ThreadId, backend: Weak<LocalBackendInner>) -> Self {
        Self {
            id: Ulid::new(),
            options,
            started_at: Utc::now(),
            started: Instant::now(),
            thread,
            state: Mutex::new(SessionState {
                state: TransactionState::Active,
                closed: false,
            }),
            backend,
        }
    }

    /// Get the transaction ID.
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn options(&self) -> &TxOptions {
        &self.options
    }

    /// When the transaction started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn timed_out(&self) -> bool {
        self.options.has_timeout() && self.started.elapsed() > self.options.timeout
    }

    fn move_to(&self, current: &mut SessionState, to: TransactionState) {
        tracing::debug!(tx_id = %self.id, from = %current.state, to = %to, "transaction state change");
        current.state = to;
    }

    fn closed_error(&self, err: &mut ErrorReport) {
        err.set(
            ErrorKind::IllegalState,
            format!("transaction {} is closed", self.id),
        );
    }

    fn not_active_error(&self, state: TransactionState, err: &mut ErrorReport) {
        err.set(
            ErrorKind::IllegalState,
            format!("transaction {} is no longer active (state: {})", self.id, state),
        );
    }

    /// Record a finished transaction and release the thread binding.
    ///
    /// Must be called without holding the session lock.
    fn finish(&self, outcome: TransactionState) {
        let Some(backend) = self.backend.upgrade() else {
            return;
        };

        let now = Utc::now();
        match outcome {
            TransactionState::Committed => backend.metrics.lock().record_commit(now),
            TransactionState::RolledBack => backend.metrics.lock().record_rollback(now),
            _ => {}
        }

        let mut bound = backend.bound.write();
        let is_bound = bound
            .get(&self.thread)
            .is_some_and(|s| std::ptr::eq(Arc::as_ptr(s), self));
        if is_bound {
            bound.remove(&self.thread);
        }
    }
}

impl TransactionSession for LocalSession {
    fn commit(&self, err: &mut ErrorReport) {
        let outcome = {
            let mut current = self.state.lock();
            if current.closed {
                self.closed_error(err);
                return;
            }

            let state = current.state;
            match state {
                TransactionState::Active if self.timed_out() => {
                    self.move_to(&mut current, TransactionState::RolledBack);
                    tracing::warn!(tx_id = %self.id, "transaction timed out and was rolled back");
                    err.set(
                        ErrorKind::TxTimeout,
                        format!(
                            "transaction {} timed out after {}ms and was rolled back",
                            self.id,
                            self.options.timeout.as_millis()
                        ),
                    );
                }
                TransactionState::Active => {
                    self.move_to(&mut current, TransactionState::Committed);
                }
                TransactionState::MarkedRollbackOnly => {
                    self.move_to(&mut current, TransactionState::RolledBack);
                    err.set(
                        ErrorKind::TxRollback,
                        format!(
                            "transaction {} was marked rollback-only and has been rolled back",
                            self.id
                        ),
                    );
                }
                other => {
                    self.not_active_error(other, err);
                    return;
                }
            }
            current.state
        };

        self.finish(outcome);
    }

    fn rollback(&self, err: &mut ErrorReport) {
        {
            let mut current = self.state.lock();
            if current.closed {
                self.closed_error(err);
                return;
            }

            let state = current.state;
            match state {
                TransactionState::Active | TransactionState::MarkedRollbackOnly => {
                    self.move_to(&mut current, TransactionState::RolledBack);
                }
                TransactionState::RolledBack => return,
                other => {
                    self.not_active_error(other, err);
                    return;
                }
            }
        }

        self.finish(TransactionState::RolledBack);
    }

    fn close(&self, _err: &mut ErrorReport) {
        let rolled_back = {
            let mut current = self.state.lock();
            if current.closed {
                return;
            }
            current.closed = true;

            if current.state.is_active() {
                self.move_to(&mut current, TransactionState::RolledBack);
                true
            } else {
                false
            }
        };

        if rolled_back {
            self.finish(TransactionState::RolledBack);
        }
    }

    fn set_rollback_only(&self, err: &mut ErrorReport) {
        let mut current = self.state.lock();
        if current.closed {
            self.closed_error(err);
            return;
        }

        let state = current.state;
        match state {
            TransactionState::Active => {
                self.move_to(&mut current, TransactionState::MarkedRollbackOnly);
            }
            TransactionState::MarkedRollbackOnly => {}
            other => self.not_active_error(other, err),
        }
    }

    fn is_rollback_only(&self, _err: &mut ErrorReport) -> bool {
        self.state.lock().state.is_rollback_only()
    }

    fn state(&self, _err: &mut ErrorReport) -> TransactionState {
        self.state.lock().state
    }
}

impl fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSession")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("started_at", &self.started_at)
            .field("state", &*self.state.lock())
            .finish()
    }
}
