//! Wallet domain types for the transaction lifecycle.
//!
//! This module defines the records the workflow reads and writes: wallet
//! transactions, their status and type, principal roles, and notifications.

use chrono::{DateTime, Utc};
use pointly_shared::types::{NotificationId, Points, TransactionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status in the verification workflow.
///
/// The only valid transitions are:
/// - Pending → Completed (approve)
/// - Pending → Rejected (reject)
///
/// Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Approved; for a top-up the points have been credited.
    Completed,
    /// Rejected; no balance change.
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }


    /// Returns true once an administrator has decided the transaction.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of wallet transaction.
///
/// Only `TopUp` is driven by this crate's workflow; the others share the
/// same record shape and are written by other parts of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Customer-initiated credit backed by a payment receipt.
    TopUp,
    /// Points spent on an order.
    Payment,
    /// Points returned from a cancelled order.
    Refund,
    /// Points paid out to a seller.
    Payout,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopUp => "top_up",
            Self::Payment => "payment",
            Self::Refund => "refund",
            Self::Payout => "payout",
        }
    }

}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform role of a principal, as supplied by the access guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Buys products and tops up points.
    Customer,
    /// Verifies top-up receipts.
    Admin,
    /// Sells products and receives payouts.
    Seller,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Seller => "seller",
        }
    }

}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted wallet transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonic identifier.
    pub id: TransactionId,
    /// Requester and beneficiary.
    pub user_id: UserId,
    /// Transaction kind.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Point-equivalent value, always positive and never changed after insert.
    pub amount: Points,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Informational payment label, e.g. "paypal".
    pub payment_method: Option<String>,
    /// Reference to the externally stored receipt.
    pub receipt_url: Option<String>,
    /// Free-form notes from the requester.
    pub notes: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the row last changed.
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a transaction. New transactions are always pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Requester and beneficiary.
    pub user_id: UserId,
    /// Transaction kind.
    pub kind: TransactionType,
    /// Positive amount.
    pub amount: Points,
    /// Payment label.
    pub payment_method: Option<String>,
    /// Receipt reference.
    pub receipt_url: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// A persisted user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Category, e.g. "payment".
    #[serde(rename = "type")]
    pub kind: String,
    /// Transaction the notification refers to.
    pub reference_id: Option<TransactionId>,
    /// Whether the recipient has seen it.
    pub is_read: bool,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}
