//! Notification templates for top-up lifecycle events.

use pointly_shared::types::{Points, TransactionId};

/// Category used for every wallet notification.
pub const PAYMENT_KIND: &str = "payment";

/// A notification to be dispatched, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Category.
    pub kind: String,
    /// Transaction the notification refers to.
    pub reference_id: Option<TransactionId>,
}

impl NotificationDraft {
    /// Sent to every administrator when a customer submits a top-up.
    #[must_use]
    pub fn top_up_requested(transaction_id: TransactionId) -> Self {
        Self {
            title: "New Top-up Request".to_string(),
            message: "A new point top-up request needs verification".to_string(),
            kind: PAYMENT_KIND.to_string(),
            reference_id: Some(transaction_id),
        }
    }

    /// Sent to the requester when an administrator approves the top-up.
    #[must_use]
    pub fn top_up_approved(transaction_id: TransactionId, amount: Points) -> Self {
        Self {
            title: "Top-up Approved".to_string(),
            message: format!("Your top-up request for {amount} points has been approved."),
            kind: PAYMENT_KIND.to_string(),
            reference_id: Some(transaction_id),
        }
    }

    /// Sent to the requester when an administrator rejects the top-up.
    #[must_use]
    pub fn top_up_rejected(transaction_id: TransactionId, amount: Points) -> Self {
        Self {
            title: "Top-up Rejected".to_string(),
            message: format!("Your top-up request for {amount} points has been rejected."),
            kind: PAYMENT_KIND.to_string(),
            reference_id: Some(transaction_id),
        }
    }
}
