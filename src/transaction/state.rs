//! Transaction states as reported by the cluster.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a remote transaction.
///
/// The authoritative value always comes from the session implementation;
/// handles never cache or infer it. `Unknown` is what a handle reports when
/// the state cannot be determined.
///
/// ```text
/// ACTIVE ──> PREPARING ──> PREPARED ──> COMMITTING ──> COMMITTED
///   │
///   └──> MARKED_ROLLBACK_ONLY ──> ROLLING_BACK ──> ROLLED_BACK
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Active,
    Preparing,
    Prepared,
    MarkedRollbackOnly,
    Committing,
    Committed,
    RollingBack,
    RolledBack,
    #[default]
    Unknown,
}

impl TransactionState {
    /// Decode a state from its protocol ordinal.
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        let state = match ordinal {
            0 => TransactionState::Active,
            1 => TransactionState::Preparing,
            2 => TransactionState::Prepared,
            3 => TransactionState::MarkedRollbackOnly,
            4 => TransactionState::Committing,
            5 => TransactionState::Committed,
            6 => TransactionState::RollingBack,
            7 => TransactionState::RolledBack,
            8 => TransactionState::Unknown,
            _ => return None,
        };
        Some(state)
    }

    /// Protocol ordinal of this state.
    pub fn ordinal(&self) -> i32 {
        match self {
            TransactionState::Active => 0,
            TransactionState::Preparing => 1,
            TransactionState::Prepared => 2,
            TransactionState::MarkedRollbackOnly => 3,
            TransactionState::Committing => 4,
            TransactionState::Committed => 5,
            TransactionState::RollingBack => 6,
            TransactionState::RolledBack => 7,
            TransactionState::Unknown => 8,
        }
    }

    /// Check if the transaction can still be committed or rolled back.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TransactionState::Active | TransactionState::MarkedRollbackOnly
        )
    }

    /// Check if the transaction has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::RolledBack
        )
    }

    /// Check if the transaction can only end in a rollback.
    pub fn is_rollback_only(&self) -> bool {
        matches!(
            self,
            TransactionState::MarkedRollbackOnly
                | TransactionState::RollingBack
                | TransactionState::RolledBack
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Active => "ACTIVE",
            TransactionState::Preparing => "PREPARING",
            TransactionState::Prepared => "PREPARED",
            TransactionState::MarkedRollbackOnly => "MARKED_ROLLBACK_ONLY",
            TransactionState::Committing => "COMMITTING",
            TransactionState::Committed => "COMMITTED",
            TransactionState::RollingBack => "ROLLING_BACK",
            TransactionState::RolledBack => "ROLLED_BACK",
            TransactionState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}
