//! Transaction error types.
//!
//! Failures travel through two channels that carry the same information:
//! - [`ErrorReport`]: a value the caller passes in and inspects afterwards
//! - [`TransactionError`]: the `Err` side of a [`TransactionResult`]
//!
//! [`ErrorReport::into_result`] is the only place one becomes the other.

use std::fmt;

use thiserror::Error;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Message reported by any operation on a handle that holds no implementation.
pub const NOT_USABLE_MESSAGE: &str = "Instance is not usable (did you check for error?).";

/// Machine-readable error kind.
///
/// Every kind maps to a stable integer code so session implementations can
/// decode statuses received from the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// No error.
    #[default]
    Success,
    /// Generic failure, also used for unusable handles.
    Generic,
    /// An argument was rejected.
    IllegalArgument,
    /// The operation is not valid in the current state.
    IllegalState,
    /// The operation is not supported by the implementation.
    Unsupported,
    /// A non-transactional timeout.
    Timeout,
    /// The transaction timed out and was rolled back.
    TxTimeout,
    /// The transaction was rolled back instead of committed.
    TxRollback,
    /// Optimistic transaction lost a conflict.
    TxOptimistic,
    /// Commit outcome is inconsistent across the cluster.
    TxHeuristic,
    /// A code this crate does not know about.
    Unknown(i32),
}

impl ErrorKind {
    /// Stable integer code of this kind.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Success => 0,
            ErrorKind::Generic => 1,
            ErrorKind::IllegalArgument => 2,
            ErrorKind::IllegalState => 3,
            ErrorKind::Unsupported => 4,
            ErrorKind::Timeout => 5,
            ErrorKind::TxTimeout => 100,
            ErrorKind::TxRollback => 101,
            ErrorKind::TxOptimistic => 102,
            ErrorKind::TxHeuristic => 103,
            ErrorKind::Unknown(code) => *code,
        }
    }

    /// Decode a kind from its integer code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ErrorKind::Success,
            1 => ErrorKind::Generic,
            2 => ErrorKind::IllegalArgument,
            3 => ErrorKind::IllegalState,
            4 => ErrorKind::Unsupported,
            5 => ErrorKind::Timeout,
            100 => ErrorKind::TxTimeout,
            101 => ErrorKind::TxRollback,
            102 => ErrorKind::TxOptimistic,
            103 => ErrorKind::TxHeuristic,
            other => ErrorKind::Unknown(other),
        }
    }

    /// Check if this kind originates from the transaction protocol.
    pub fn is_transactional(&self) -> bool {
        matches!(
            self,
            ErrorKind::TxTimeout
                | ErrorKind::TxRollback
                | ErrorKind::TxOptimistic
                | ErrorKind::TxHeuristic
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Success => write!(f, "success"),
            ErrorKind::Generic => write!(f, "generic error"),
            ErrorKind::IllegalArgument => write!(f, "illegal argument"),
            ErrorKind::IllegalState => write!(f, "illegal state"),
            ErrorKind::Unsupported => write!(f, "unsupported operation"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::TxTimeout => write!(f, "transaction timeout"),
            ErrorKind::TxRollback => write!(f, "transaction rolled back"),
            ErrorKind::TxOptimistic => write!(f, "optimistic transaction conflict"),
            ErrorKind::TxHeuristic => write!(f, "heuristic transaction failure"),
            ErrorKind::Unknown(code) => write!(f, "unknown error ({})", code),
        }
    }
}

/// Success-or-failure value filled in by the explicit-error operations.
///
/// A default-constructed report means success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    /// A successful report.
    pub fn success() -> Self {
        Self::default()
    }

    /// A report of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The report set by handles that hold no implementation.
    pub fn not_usable() -> Self {
        Self::new(ErrorKind::Generic, NOT_USABLE_MESSAGE)
    }

    /// Error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message; empty on success.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.kind == ErrorKind::Success
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Reset to success.
    pub fn reset(&mut self) {
        *self = Self::success();
    }

    /// Overwrite with a failure.
    pub fn set(&mut self, kind: ErrorKind, message: impl Into<String>) {
        *self = Self::new(kind, message);
    }

    /// Convert into a result, raising the failure if there is one.
    pub fn into_result(self) -> TransactionResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(TransactionError {
                kind: self.kind,
                message: self.message,
            })
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "success")
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl From<TransactionError> for ErrorReport {
    fn from(err: TransactionError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// A failure raised from an [`ErrorReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransactionError {
    kind: ErrorKind,
    message: String,
}

impl TransactionError {
    /// Create an error directly.
    ///
    /// A `Success` kind is coerced to `Generic` since an error must fail.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let kind = match kind {
            ErrorKind::Success => ErrorKind::Generic,
            other => other,
        };
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TxOptimistic | ErrorKind::TxTimeout | ErrorKind::Timeout
        )
    }

    /// Check if this is the unusable-handle failure.
    pub fn is_not_usable(&self) -> bool {
        self.kind == ErrorKind::Generic && self.message == NOT_USABLE_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_is_success() {
        let report = ErrorReport::default();
        assert!(report.is_success());
        assert_eq!(report.kind(), ErrorKind::Success);
        assert!(report.message().is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_failure_raises_same_information() {
        let report = ErrorReport::new(ErrorKind::TxRollback, "already committed");
        let err = report.clone().into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TxRollback);
        assert_eq!(err.message(), "already committed");
        assert_eq!(ErrorReport::from(err), report);
    }

    #[test]
    fn test_reset_after_failure() {
        let mut report = ErrorReport::not_usable();
        assert!(report.is_failure());
        report.reset();
        assert_eq!(report, ErrorReport::success());
    }

    #[test]
    fn test_not_usable_detection() {
        let err = ErrorReport::not_usable().into_result().unwrap_err();
        assert!(err.is_not_usable());
        assert_eq!(
            err.to_string(),
            "generic error: Instance is not usable (did you check for error?)."
        );

        let other = TransactionError::new(ErrorKind::Generic, "boom");
        assert!(!other.is_not_usable());
    }

    #[test]
    fn test_error_codes() {
        for kind in [
            ErrorKind::Success,
            ErrorKind::Generic,
            ErrorKind::IllegalState,
            ErrorKind::TxHeuristic,
            ErrorKind::Unknown(4242),
        ] {
            assert_eq!(ErrorKind::from_code(kind.code()), kind);
        }
        assert!(ErrorKind::TxOptimistic.is_transactional());
        assert!(!ErrorKind::Timeout.is_transactional());
    }

    #[test]
    fn test_error_retryable() {
        assert!(TransactionError::new(ErrorKind::TxOptimistic, "conflict").is_retryable());
        assert!(!TransactionError::new(ErrorKind::IllegalState, "closed").is_retryable());
    }

    #[test]
    fn test_success_kind_never_builds_success_error() {
        let err = TransactionError::new(ErrorKind::Success, "odd");
        assert_eq!(err.kind(), ErrorKind::Generic);
    }
}
