//! Transaction concurrency modes and isolation levels.
//!
//! A transaction is started with one of each:
//! - Concurrency: when locks are acquired (Optimistic / Pessimistic)
//! - Isolation: what concurrent changes a transaction may observe

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transaction concurrency mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionConcurrency {
    /// Optimistic concurrency.
    ///
    /// Locks are acquired during the prepare phase of commit. Conflicting
    /// writers are detected at commit time and fail with an optimistic
    /// transaction error.
    Optimistic,

    /// Pessimistic concurrency.
    ///
    /// Locks are acquired on first access, so conflicts block instead of
    /// failing at commit.
    #[default]
    Pessimistic,
}

impl TransactionConcurrency {
    /// Protocol ordinal of this mode.
    pub fn ordinal(&self) -> i32 {
        match self {
            TransactionConcurrency::Optimistic => 0,
            TransactionConcurrency::Pessimistic => 1,
        }
    }

    /// Decode a mode from its protocol ordinal.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(TransactionConcurrency::Optimistic),
            1 => Some(TransactionConcurrency::Pessimistic),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionConcurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionConcurrency::Optimistic => write!(f, "OPTIMISTIC"),
            TransactionConcurrency::Pessimistic => write!(f, "PESSIMISTIC"),
        }
    }
}

impl std::str::FromStr for TransactionConcurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPTIMISTIC" => Ok(TransactionConcurrency::Optimistic),
            "PESSIMISTIC" => Ok(TransactionConcurrency::Pessimistic),
            _ => Err(format!("unknown concurrency mode: {}", s)),
        }
    }
}

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionIsolation {
    /// Read Committed isolation.
    ///
    /// Each read sees the most recently committed value; repeated reads of
    /// the same key may differ.
    ReadCommitted,

    /// Repeatable Read isolation.
    ///
    /// A value read once is seen unchanged for the rest of the transaction.
    #[default]
    RepeatableRead,

    /// Serializable isolation.
    ///
    /// Transactions behave as if executed one after another. With optimistic
    /// concurrency, conflicting commits fail instead of blocking.
    Serializable,
}

impl TransactionIsolation {
    /// Protocol ordinal of this level.
    pub fn ordinal(&self) -> i32 {
        match self {
            TransactionIsolation::ReadCommitted => 0,
            TransactionIsolation::RepeatableRead => 1,
            TransactionIsolation::Serializable => 2,
        }
    }

    /// Decode a level from its protocol ordinal.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        match ordinal {
            0 => Some(TransactionIsolation::ReadCommitted),
            1 => Some(TransactionIsolation::RepeatableRead),
            2 => Some(TransactionIsolation::Serializable),
            _ => None,
        }
    }

    /// Check if reads within the transaction are repeatable.
    pub fn is_repeatable(&self) -> bool {
        !matches!(self, TransactionIsolation::ReadCommitted)
    }

    /// Get a human-readable description of this isolation level.
    pub fn description(&self) -> &'static str {
        match self {
            TransactionIsolation::ReadCommitted => "Each read sees the latest committed data",
            TransactionIsolation::RepeatableRead => {
                "Values read once stay the same for the rest of the transaction"
            }
            TransactionIsolation::Serializable => {
                "Transactions behave as if executed one after another"
            }
        }
    }
}

impl fmt::Display for TransactionIsolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionIsolation::ReadCommitted => write!(f, "READ COMMITTED"),
            TransactionIsolation::RepeatableRead => write!(f, "REPEATABLE READ"),
            TransactionIsolation::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

/// Parse isolation level from string (SQL syntax).
impl std::str::FromStr for TransactionIsolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "READ COMMITTED" | "READ_COMMITTED" | "READCOMMITTED" => {
                Ok(TransactionIsolation::ReadCommitted)
            }
            "REPEATABLE READ" | "REPEATABLE_READ" | "REPEATABLEREAD" => {
                Ok(TransactionIsolation::RepeatableRead)
            }
            "SERIALIZABLE" => Ok(TransactionIsolation::Serializable),
            _ => Err(format!("unknown isolation level: {}", s)),
        }
    }
}
