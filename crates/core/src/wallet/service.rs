//! Top-up service for request validation and state transitions.
//!
//! This module implements the decision logic of the top-up workflow with no
//! I/O: what a valid request looks like, which transitions are legal, and
//! what effects a resolution must produce. The engine applies those effects
//! inside a unit of work.

use pointly_shared::types::{Points, TransactionId, UserId};

use crate::wallet::error::WalletError;
use crate::wallet::notification::NotificationDraft;
use crate::wallet::types::{NewTransaction, Transaction, TransactionStatus, TransactionType};

/// A customer's top-up request as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpRequest {
    /// Requested points; must be positive.
    pub amount: i64,
    /// Payment label, e.g. "paypal"; must be non-empty.
    pub payment_method: String,
    /// Reference to the uploaded receipt; must be non-empty.
    pub receipt_url: String,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

/// A top-up request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTopUp {
    /// Positive amount.
    pub amount: Points,
    /// Trimmed payment label.
    pub payment_method: String,
    /// Trimmed receipt reference.
    pub receipt_url: String,
    /// Notes, `None` when blank.
    pub notes: Option<String>,
}

/// The effects an administrator decision must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpResolution {
    /// Transaction being resolved.
    pub transaction_id: TransactionId,
    /// Beneficiary.
    pub user_id: UserId,
    /// Terminal status to write.
    pub new_status: TransactionStatus,
    /// Points to credit; `Some` only on approval.
    pub credit: Option<Points>,
    /// Notification for the beneficiary.
    pub notification: NotificationDraft,
}

/// Stateless service for the top-up workflow.
pub struct TopUpService;

impl TopUpService {
    /// Validate a customer's top-up request.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidInput` if the amount is not positive, or
    /// the payment method or receipt is blank.
    pub fn validate_request(request: TopUpRequest) -> Result<ValidatedTopUp, WalletError> {
        let amount = Points::positive(request.amount)
            .ok_or_else(|| WalletError::InvalidInput("Invalid amount".to_string()))?;

        let payment_method = request.payment_method.trim();
        if payment_method.is_empty() {
            return Err(WalletError::InvalidInput(
                "Payment method is required".to_string(),
            ));
        }

        let receipt_url = request.receipt_url.trim();
        if receipt_url.is_empty() {
            return Err(WalletError::InvalidInput("Receipt is required".to_string()));
        }

        let notes = request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(ValidatedTopUp {
            amount,
            payment_method: payment_method.to_string(),
            receipt_url: receipt_url.to_string(),
            notes,
        })
    }

    /// Build the pending transaction row for a validated request.
    #[must_use]
    pub fn new_transaction(user_id: UserId, request: ValidatedTopUp) -> NewTransaction {
        NewTransaction {
            user_id,
            kind: TransactionType::TopUp,
            amount: request.amount,
            payment_method: Some(request.payment_method),
            receipt_url: Some(request.receipt_url),
            notes: request.notes,
        }
    }

    /// Decide the effects of resolving a top-up.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NotFoundOrAlreadyProcessed` if the transaction
    /// is not a top-up or is no longer pending.
    pub fn resolve(transaction: &Transaction, approved: bool) -> Result<TopUpResolution, WalletError> {
        if transaction.kind != TransactionType::TopUp
            || transaction.status != TransactionStatus::Pending
        {
            return Err(WalletError::NotFoundOrAlreadyProcessed(transaction.id));
        }

        let resolution = if approved {
            TopUpResolution {
                transaction_id: transaction.id,
                user_id: transaction.user_id,
                new_status: TransactionStatus::Completed,
                credit: Some(transaction.amount),
                notification: NotificationDraft::top_up_approved(
                    transaction.id,
                    transaction.amount,
                ),
            }
        } else {
            TopUpResolution {
                transaction_id: transaction.id,
                user_id: transaction.user_id,
                new_status: TransactionStatus::Rejected,
                credit: None,
                notification: NotificationDraft::top_up_rejected(
                    transaction.id,
                    transaction.amount,
                ),
            }
        };

        Ok(resolution)
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Completed
    /// - Pending → Rejected
    #[must_use]
    pub fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            (
                TransactionStatus::Pending,
                TransactionStatus::Completed | TransactionStatus::Rejected
            )
        )
    }
}
