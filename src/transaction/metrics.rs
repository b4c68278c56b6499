//! Transaction metrics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters and timestamps of finished transactions.
///
/// A default value is an empty snapshot, which is also what a facade
/// without a backend returns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionMetrics {
    /// Time of the last commit.
    pub commit_time: Option<DateTime<Utc>>,
    /// Time of the last rollback.
    pub rollback_time: Option<DateTime<Utc>>,
    /// Number of committed transactions.
    pub commits: u32,
    /// Number of rolled back transactions.
    pub rollbacks: u32,
}

impl TransactionMetrics {
    /// Record a commit at the given time.
    pub fn record_commit(&mut self, at: DateTime<Utc>) {
        self.commits = self.commits.saturating_add(1);
        self.commit_time = Some(at);
    }

    /// Record a rollback at the given time.
    pub fn record_rollback(&mut self, at: DateTime<Utc>) {
        self.rollbacks = self.rollbacks.saturating_add(1);
        self.rollback_time = Some(at);
    }

    /// Total number of finished transactions.
    pub fn finished(&self) -> u64 {
        u64::from(self.commits) + u64::from(self.rollbacks)
    }
}
