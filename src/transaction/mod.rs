//! Client-side transactions for a clustered data store.
//!
//! The handles here do not run the transaction protocol. They forward every
//! lifecycle operation to a session owned by the protocol layer, and report
//! failures through either a `Result` or an explicit [`ErrorReport`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   tx_start / get_tx   ┌─────────────────────────┐
//! │    Transactions    │ ────────────────────> │ dyn TransactionsBackend │
//! │  (copyable facade) │                       │    (protocol layer)     │
//! └────────────────────┘                       └─────────────────────────┘
//!           │ hands out                                     │ creates
//!           ▼                                               ▼
//! ┌────────────────────┐   commit / rollback   ┌─────────────────────────┐
//! │    Transaction     │ ────────────────────> │ dyn TransactionSession  │
//! │  (copyable handle) │   close / state ...   │    (shared via Arc)     │
//! └────────────────────┘                       └─────────────────────────┘
//! ```
//!
//! [`LocalBackend`] implements both traits in-process.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use gridtx::transaction::{ErrorReport, LocalBackend, TransactionState, Transactions};
//!
//! let txs = Transactions::new(Arc::new(LocalBackend::new()));
//!
//! // Result style
//! let tx = txs.tx_start()?;
//! tx.commit()?;
//! assert_eq!(tx.state()?, TransactionState::Committed);
//!
//! // Explicit-error style
//! let mut err = ErrorReport::default();
//! tx.rollback_with(&mut err);
//! assert!(err.is_failure());
//! # Ok::<(), gridtx::transaction::TransactionError>(())
//! ```

mod config;
mod delegate;
mod error;
mod handle;
mod isolation;
mod local;
mod manager;
mod metrics;
mod session;
mod state;

pub use config::{ConfigError, TransactionConfig, TxOptions};
pub use error::{ErrorKind, ErrorReport, TransactionError, TransactionResult, NOT_USABLE_MESSAGE};
pub use handle::Transaction;
pub use isolation::{TransactionConcurrency, TransactionIsolation};
pub use local::{LocalBackend, LocalSession};
pub use manager::Transactions;
pub use metrics::TransactionMetrics;
pub use session::{SharedSession, TransactionSession, TransactionsBackend};
pub use state::TransactionState;
