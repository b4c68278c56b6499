//! Transactions facade - the entry point that hands out transaction handles.
//!
//! [`Transactions`] follows the same contract as [`Transaction`]: it is a
//! cloneable reference to a backend, and every operation comes in a
//! `Result` form and an explicit-error form.

use std::fmt;
use std::sync::Arc;

use crate::transaction::config::{TransactionConfig, TxOptions};
use crate::transaction::delegate::{raise, Delegate};
use crate::transaction::error::{ErrorKind, ErrorReport, TransactionResult};
use crate::transaction::handle::Transaction;
use crate::transaction::metrics::TransactionMetrics;
use crate::transaction::session::TransactionsBackend;

/// Starts transactions and exposes transaction metrics.
///
/// Cloning shares the backend.
#[derive(Clone, Default)]
pub struct Transactions {
    backend: Delegate<dyn TransactionsBackend>,
    config: TransactionConfig,
}

impl Transactions {
    /// Create a facade over the given backend with default configuration.
    pub fn new(backend: Arc<dyn TransactionsBackend>) -> Self {
        Self::with_config(backend, TransactionConfig::default())
    }

    /// Create a facade over the given backend.
    pub fn with_config(backend: Arc<dyn TransactionsBackend>, config: TransactionConfig) -> Self {
        Self {
            backend: Delegate::new(Some(backend)),
            config,
        }
    }

    /// Create a facade without a backend. Every operation fails.
    pub fn unusable() -> Self {
        Self::default()
    }

    pub fn is_usable(&self) -> bool {
        self.backend.is_usable()
    }

    /// Configuration applied by [`Transactions::tx_start`].
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Start a transaction with the configured defaults.
    pub fn tx_start(&self) -> TransactionResult<Transaction> {
        raise(|err| self.tx_start_with(err))
    }

    /// Start a transaction with the configured defaults.
    ///
    /// On failure the returned handle is unusable.
    pub fn tx_start_with(&self, err: &mut ErrorReport) -> Transaction {
        self.tx_start_opts_with(self.config.tx_options(), err)
    }

    /// Start a transaction with explicit options.
    pub fn tx_start_opts(&self, options: TxOptions) -> TransactionResult<Transaction> {
        raise(|err| self.tx_start_opts_with(options, err))
    }

    pub fn tx_start_opts_with(&self, options: TxOptions, err: &mut ErrorReport) -> Transaction {
        self.backend.forward("tx_start", err, |backend, err| {
            tracing::debug!(
                concurrency = %options.concurrency,
                isolation = %options.isolation,
                timeout_ms = options.timeout.as_millis() as u64,
                size = options.size,
                "starting transaction"
            );

            let session = backend.tx_start(&options, err);
            if session.is_none() && err.is_success() {
                err.set(ErrorKind::Generic, "backend did not start a transaction");
            }
            Transaction::new(session)
        })
    }

    /// The transaction bound to the calling thread.
    ///
    /// Returns an unusable handle when there is none.
    pub fn get_tx(&self) -> TransactionResult<Transaction> {
        raise(|err| self.get_tx_with(err))
    }

    pub fn get_tx_with(&self, err: &mut ErrorReport) -> Transaction {
        self.backend
            .forward("get_tx", err, |backend, err| Transaction::new(backend.current(err)))
    }

    pub fn metrics(&self) -> TransactionResult<TransactionMetrics> {
        raise(|err| self.metrics_with(err))
    }

    pub fn metrics_with(&self, err: &mut ErrorReport) -> TransactionMetrics {
        self.backend
            .forward("metrics", err, |backend, err| backend.metrics(err))
    }

    pub fn reset_metrics(&self) -> TransactionResult<()> {
        raise(|err| self.reset_metrics_with(err))
    }

    pub fn reset_metrics_with(&self, err: &mut ErrorReport) {
        self.backend
            .forward("reset_metrics", err, |backend, err| backend.reset_metrics(err))
    }

    /// Execute a function within a transaction.
    ///
    /// If the function returns Ok, the transaction is committed; if it
    /// returns Err, the transaction is rolled back. The transaction is
    /// closed either way.
    pub fn with_transaction<F, T>(&self, f: F) -> TransactionResult<T>
    where
        F: FnOnce(&Transaction) -> TransactionResult<T>,
    {
        self.with_transaction_opts(self.config.tx_options(), f)
    }

    /// Execute a function within a transaction started with explicit options.
    pub fn with_transaction_opts<F, T>(&self, options: TxOptions, f: F) -> TransactionResult<T>
    where
        F: FnOnce(&Transaction) -> TransactionResult<T>,
    {
        let tx = self.tx_start_opts(options)?;

        let outcome = match f(&tx) {
            Ok(value) => tx.commit().map(|()| value),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed transaction body failed");
                }
                Err(e)
            }
        };
        let closed = tx.close();

        let value = outcome?;
        closed?;
        Ok(value)
    }
}

impl fmt::Debug for Transactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transactions")
            .field("usable", &self.is_usable())
            .field("config", &self.config)
            .finish()
    }
}
