//! GridTx - client-side transaction handles for a clustered data store
//!
//! This crate provides the lightweight, cloneable [`Transaction`] handle and
//! the [`Transactions`] facade that starts transactions. Both forward to
//! sessions owned by a protocol layer and expose every operation twice: once
//! returning a `Result`, once filling an [`ErrorReport`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridtx::{LocalBackend, Transactions};
//!
//! let txs = Transactions::new(Arc::new(LocalBackend::new()));
//! txs.with_transaction(|tx| tx.state().map(|_| ())).unwrap();
//! ```

pub mod transaction;

pub use transaction::{
    ErrorKind, ErrorReport, LocalBackend, Transaction, TransactionConfig, TransactionError,
    TransactionResult, TransactionState, Transactions,
};
