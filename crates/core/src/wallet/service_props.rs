//! Property-based tests for TopUpService and Balance.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use pointly_shared::types::{Points, TransactionId, UserId};

use crate::wallet::error::{StoreError, WalletError};
use crate::wallet::ledger::Balance;
use crate::wallet::service::{TopUpRequest, TopUpService};
use crate::wallet::types::{Transaction, TransactionStatus, TransactionType};

fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Completed),
        Just(TransactionStatus::Rejected),
    ]
}

fn arb_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::TopUp),
        Just(TransactionType::Payment),
        Just(TransactionType::Refund),
        Just(TransactionType::Payout),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn transaction(
    id: i64,
    user_id: UserId,
    kind: TransactionType,
    status: TransactionStatus,
    amount: i64,
) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: TransactionId(id),
        user_id,
        kind,
        amount: Points::new(amount).unwrap_or(Points::ZERO),
        status,
        payment_method: Some("bank_transfer".to_string()),
        receipt_url: Some("/receipts/1.png".to_string()),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Request validation
    // =========================================================================

    /// Any non-positive amount is rejected before anything is recorded
    #[test]
    fn prop_non_positive_amount_rejected(amount in i64::MIN..=0) {
        let result = TopUpService::validate_request(TopUpRequest {
            amount,
            payment_method: "paypal".to_string(),
            receipt_url: "/r/1".to_string(),
            notes: None,
        });
        prop_assert!(matches!(result, Err(WalletError::InvalidInput(_))));
    }

    /// Any positive amount with method and receipt is accepted unchanged
    #[test]
    fn prop_positive_amount_accepted(
        amount in 1..=i64::MAX,
        method in "[a-z_]{1,20}",
        receipt in "/[a-z0-9/]{1,40}",
    ) {
        let validated = TopUpService::validate_request(TopUpRequest {
            amount,
            payment_method: method.clone(),
            receipt_url: receipt.clone(),
            notes: None,
        }).unwrap();
        prop_assert_eq!(validated.amount.value(), amount);
        prop_assert_eq!(validated.payment_method, method);
        prop_assert_eq!(validated.receipt_url, receipt);
    }

    /// Whitespace-only receipts never pass
    #[test]
    fn prop_blank_receipt_rejected(amount in 1..=1_000_000i64, blank in "[ \t]{0,8}") {
        let result = TopUpService::validate_request(TopUpRequest {
            amount,
            payment_method: "paypal".to_string(),
            receipt_url: blank,
            notes: None,
        });
        prop_assert!(matches!(result, Err(WalletError::InvalidInput(_))));
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Only a pending top-up can be resolved; everything else is not found
    #[test]
    fn prop_resolve_requires_pending_top_up(
        user in arb_user(),
        kind in arb_type(),
        status in arb_status(),
        amount in 1..=1_000_000i64,
        approved in any::<bool>(),
    ) {
        let tx = transaction(1, user, kind, status, amount);
        let result = TopUpService::resolve(&tx, approved);

        if kind == TransactionType::TopUp && status == TransactionStatus::Pending {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(WalletError::NotFoundOrAlreadyProcessed(_))));
        }
    }

    /// Approval credits exactly the stored amount to the requester
    #[test]
    fn prop_approval_credit_matches_amount(
        user in arb_user(),
        amount in 1..=1_000_000i64,
        id in 1..=i64::MAX,
    ) {
        let tx = transaction(id, user, TransactionType::TopUp, TransactionStatus::Pending, amount);
        let resolution = TopUpService::resolve(&tx, true).unwrap();

        prop_assert_eq!(resolution.new_status, TransactionStatus::Completed);
        prop_assert_eq!(resolution.credit.map(Points::value), Some(amount));
        prop_assert_eq!(resolution.user_id, user);
        prop_assert_eq!(resolution.notification.reference_id, Some(TransactionId(id)));
    }

    /// Rejection never credits
    #[test]
    fn prop_rejection_never_credits(user in arb_user(), amount in 1..=1_000_000i64) {
        let tx = transaction(1, user, TransactionType::TopUp, TransactionStatus::Pending, amount);
        let resolution = TopUpService::resolve(&tx, false).unwrap();

        prop_assert_eq!(resolution.new_status, TransactionStatus::Rejected);
        prop_assert_eq!(resolution.credit, None);
    }

    /// Terminal states accept no further transition
    #[test]
    fn prop_terminal_states_are_final(from in arb_status(), to in arb_status()) {
        if from.is_terminal() {
            prop_assert!(!TopUpService::is_valid_transition(from, to));
        }
    }

    // =========================================================================
    // Balance
    // =========================================================================

    /// Crediting grows points by exactly the amount and leaves reserved alone
    #[test]
    fn prop_credit_is_exact(
        user in arb_user(),
        points in 0..=1_000_000_000i64,
        reserved in 0..=1_000_000_000i64,
        amount in 1..=1_000_000_000i64,
    ) {
        let before = Balance::from_raw(user, points, reserved).unwrap();
        let after = before.credited(Points::new(amount).unwrap()).unwrap();

        prop_assert_eq!(after.points.value(), points + amount);
        prop_assert_eq!(after.reserved_points, before.reserved_points);
    }

    /// A credit past the largest balance is reported, never wrapped or saturated
    #[test]
    fn prop_credit_overflow_reported(
        user in arb_user(),
        headroom in 0..=1_000i64,
        excess in 1..=1_000i64,
    ) {
        let before = Balance::from_raw(user, i64::MAX - headroom, 0).unwrap();
        let amount = Points::new(headroom + excess).unwrap();

        let result = before.credited(amount);
        prop_assert!(matches!(
            result,
            Err(StoreError::CreditOverflow { user_id, amount: rejected })
                if user_id == user && rejected == amount
        ), "expected CreditOverflow, got {:?}", result);
        prop_assert!(!WalletError::from(result.unwrap_err()).is_retryable());
    }

    /// Negative stored values are always reported as invariant violations
    #[test]
    fn prop_negative_balance_rejected(user in arb_user(), points in i64::MIN..0) {
        prop_assert!(matches!(
            Balance::from_raw(user, points, 0),
            Err(StoreError::InvariantViolation(_))
        ));
        prop_assert!(matches!(
            Balance::from_raw(user, 0, points),
            Err(StoreError::InvariantViolation(_))
        ));
    }
}
