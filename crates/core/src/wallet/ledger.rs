//! Per-user point balances and their invariants.
//!
//! A balance row has two fields, available `points` and `reserved_points`.
//! Both must stay non-negative. Storage backends hand raw column values to
//! [`Balance::from_raw`], which is the single place the invariant is checked
//! on the way in; every other path works with the already-validated type.

use pointly_shared::types::{Points, UserId};
use serde::{Deserialize, Serialize};

use crate::wallet::error::StoreError;

/// A user's point balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Owner of the balance.
    pub user_id: UserId,
    /// Points available to spend.
    pub points: Points,
    /// Points earmarked for outstanding obligations.
    pub reserved_points: Points,
}

impl Balance {
    /// Creates an empty balance for a new user.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            points: Points::ZERO,
            reserved_points: Points::ZERO,
        }
    }

    /// Builds a balance from stored column values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvariantViolation` if either field is negative.
    pub fn from_raw(user_id: UserId, points: i64, reserved_points: i64) -> Result<Self, StoreError> {
        let points = Points::new(points).ok_or_else(|| {
            StoreError::InvariantViolation(format!("user {user_id} has negative points ({points})"))
        })?;
        let reserved_points = Points::new(reserved_points).ok_or_else(|| {
            StoreError::InvariantViolation(format!(
                "user {user_id} has negative reserved points ({reserved_points})"
            ))
        })?;

        Ok(Self {
            user_id,
            points,
            reserved_points,
        })
    }

    /// Returns the balance after crediting `amount` available points.
    ///
    /// Reserved points are untouched.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount` is zero
    /// - `StoreError::CreditOverflow` if the sum overflows
    pub fn credited(self, amount: Points) -> Result<Self, StoreError> {
        ensure_creditable(amount)?;
        let points = self
            .points
            .checked_add(amount)
            .ok_or(StoreError::CreditOverflow {
                user_id: self.user_id,
                amount,
            })?;

        Ok(Self { points, ..self })
    }
}

/// Checks the balance read back after crediting `amount` to `user_id`.
///
/// The read itself went through [`Balance::from_raw`], so both fields are
/// already known to be non-negative. What is left to check is that the row
/// exists and that the credit is reflected in it.
///
/// # Errors
///
/// - `StoreError::MissingRow` if there is no balance row
/// - `StoreError::InvariantViolation` if available points are below `amount`
pub fn verify_after_credit(
    user_id: UserId,
    balance: Option<Balance>,
    amount: Points,
) -> Result<Balance, StoreError> {
    let balance =
        balance.ok_or_else(|| StoreError::MissingRow(format!("balance for user {user_id}")))?;

    if balance.points < amount {
        return Err(StoreError::InvariantViolation(format!(
            "user {user_id} holds {} points after a credit of {amount}",
            balance.points
        )));
    }

    Ok(balance)
}

/// Checks that `amount` may be passed to a credit.
///
/// `Points` cannot be negative, so the only rejected value is zero.
///
/// # Errors
///
/// Returns `StoreError::InvalidAmount` for a zero amount.
pub fn ensure_creditable(amount: Points) -> Result<(), StoreError> {
    if amount.is_zero() {
        return Err(StoreError::InvalidAmount(amount.value()));
    }
    Ok(())
}
