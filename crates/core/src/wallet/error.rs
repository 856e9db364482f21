//! Wallet error types.
//!
//! `WalletError` is what the engine returns to callers. `StoreError` is what
//! storage backends return to the engine; the engine folds it into
//! `WalletError` so callers only ever see the four workflow outcomes.

use pointly_shared::AppError;
use pointly_shared::types::{Points, TransactionId, UserId};
use thiserror::Error;

use crate::wallet::types::Role;

/// Errors returned by wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The actor lacks the capability the operation requires.
    #[error("Unauthorized: operation requires the {required} role, actor is {actual}")]
    Unauthorized {
        /// Role the operation requires.
        required: Role,
        /// Role the actor holds.
        actual: Role,
    },

    /// Malformed amount, missing payment method, missing receipt, or an
    /// amount the beneficiary's balance cannot absorb.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The transaction is missing, not a top-up, or no longer pending.
    ///
    /// This is the expected outcome of losing a resolution race.
    #[error("Transaction {0} not found or already processed")]
    NotFoundOrAlreadyProcessed(TransactionId),

    /// The unit of work could not commit. Nothing was applied.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl WalletError {
    /// Returns the error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFoundOrAlreadyProcessed(_) => "NOT_FOUND_OR_ALREADY_PROCESSED",
            Self::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// Returns true if the caller may retry the whole operation from scratch.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}

/// Errors returned by storage backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A credit amount was zero or negative.
    #[error("credit amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Crediting would push the balance past the largest representable
    /// value. Retrying cannot help.
    #[error("crediting {amount} points to user {user_id} would overflow the balance")]
    CreditOverflow {
        /// Beneficiary.
        user_id: UserId,
        /// Rejected credit.
        amount: Points,
    },

    /// A row the operation depends on does not exist.
    #[error("missing row: {0}")]
    MissingRow(String),

    /// A stored value breaks a ledger invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The backend itself failed (connection, constraint, commit).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for storage calls.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for WalletError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidAmount(amount) => {
                Self::InvalidInput(format!("credit amount must be positive, got {amount}"))
            }
            overflow @ StoreError::CreditOverflow { .. } => {
                Self::InvalidInput(overflow.to_string())
            }
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Unauthorized { .. } => Self::Unauthorized(err.to_string()),
            WalletError::InvalidInput(msg) => Self::Validation(msg),
            WalletError::NotFoundOrAlreadyProcessed(_) => Self::NotFound(err.to_string()),
            WalletError::StorageFailure(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error() {
        let err = WalletError::Unauthorized {
            required: Role::Admin,
            actual: Role::Customer,
        };
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("admin"));
        assert!(err.to_string().contains("customer"));
    }

    #[test]
    fn test_not_found_error() {
        let err = WalletError::NotFoundOrAlreadyProcessed(TransactionId(7));
        assert_eq!(err.error_code(), "NOT_FOUND_OR_ALREADY_PROCESSED");
        assert_eq!(
            err.to_string(),
            "Transaction 7 not found or already processed"
        );
    }

    #[test]
    fn test_storage_failure_is_retryable() {
        let err = WalletError::StorageFailure("connection reset".into());
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            WalletError::from(StoreError::InvalidAmount(0)),
            WalletError::InvalidInput(_)
        ));
        let overflow = WalletError::from(StoreError::CreditOverflow {
            user_id: UserId::new(),
            amount: Points::new(5).unwrap(),
        });
        assert!(matches!(overflow, WalletError::InvalidInput(ref msg) if msg.contains("overflow")));
        assert!(!overflow.is_retryable());
        assert!(matches!(
            WalletError::from(StoreError::MissingRow("balance".into())),
            WalletError::StorageFailure(_)
        ));
        assert!(matches!(
            WalletError::from(StoreError::InvariantViolation("negative".into())),
            WalletError::StorageFailure(_)
        ));
        assert!(matches!(
            WalletError::from(StoreError::Backend("timeout".into())),
            WalletError::StorageFailure(_)
        ));
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = WalletError::InvalidInput("Invalid amount".into()).into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");

        let app: AppError = WalletError::NotFoundOrAlreadyProcessed(TransactionId(1)).into();
        assert_eq!(app.error_code(), "NOT_FOUND");

        let app: AppError = WalletError::StorageFailure("down".into()).into();
        assert!(app.is_retryable());

        let app: AppError = WalletError::Unauthorized {
            required: Role::Customer,
            actual: Role::Seller,
        }
        .into();
        assert_eq!(app.error_code(), "UNAUTHORIZED");
    }
}
