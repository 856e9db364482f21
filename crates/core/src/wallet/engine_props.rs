//! Property-based tests for TopUpEngine over arbitrary operation sequences.
//!
//! Each case drives a fresh in-memory store through a random mix of requests
//! and resolutions and compares it with a plain model after every step.

use std::collections::HashMap;

use proptest::prelude::*;
use proptest::sample::Index;
use proptest::test_runner::TestCaseError;

use pointly_shared::types::{TransactionId, UserId};

use crate::wallet::access::Principal;
use crate::wallet::engine::TopUpEngine;
use crate::wallet::error::WalletError;
use crate::wallet::memory::MemoryWalletStore;
use crate::wallet::service::TopUpRequest;
use crate::wallet::store::WalletQueries;
use crate::wallet::types::{Role, TransactionStatus};

const CUSTOMERS: usize = 2;

#[derive(Debug, Clone)]
enum Op {
    Request {
        customer: usize,
        amount: i64,
    },
    Resolve {
        target: Index,
        approved: bool,
        by_admin: bool,
    },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..CUSTOMERS, -20..=1_000i64)
            .prop_map(|(customer, amount)| Op::Request { customer, amount }),
        (any::<Index>(), any::<bool>(), prop::bool::weighted(0.9)).prop_map(
            |(target, approved, by_admin)| Op::Resolve {
                target,
                approved,
                by_admin,
            }
        ),
    ]
}

struct Issued {
    id: TransactionId,
    customer: usize,
    amount: i64,
    status: TransactionStatus,
}

struct Model {
    issued: Vec<Issued>,
    points: [i64; CUSTOMERS],
    requests: usize,
}

impl Model {
    /// Picks an issued transaction, or an id nothing was ever issued under.
    fn target(&self, index: &Index) -> (TransactionId, Option<usize>) {
        if self.issued.is_empty() {
            return (TransactionId(i64::MAX), None);
        }
        let at = index.index(self.issued.len());
        (self.issued[at].id, Some(at))
    }
}

fn top_up(amount: i64) -> TopUpRequest {
    TopUpRequest {
        amount,
        payment_method: "bank_transfer".to_string(),
        receipt_url: "/receipts/1.png".to_string(),
        notes: None,
    }
}

async fn check_sequence(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let store = MemoryWalletStore::new();
    let mut customers = Vec::with_capacity(CUSTOMERS);
    for _ in 0..CUSTOMERS {
        customers.push(Principal::new(store.add_user(Role::Customer).await, Role::Customer));
    }
    let admin = Principal::new(store.add_user(Role::Admin).await, Role::Admin);
    let engine = TopUpEngine::new(store);

    let mut model = Model {
        issued: Vec::new(),
        points: [0; CUSTOMERS],
        requests: 0,
    };

    for op in ops {
        match op {
            Op::Request { customer, amount } => {
                let result = engine.request_top_up(&customers[customer], top_up(amount)).await;
                if amount > 0 {
                    let id = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
                    if let Some(last) = model.issued.last() {
                        prop_assert!(id > last.id);
                    }
                    model.issued.push(Issued {
                        id,
                        customer,
                        amount,
                        status: TransactionStatus::Pending,
                    });
                    model.requests += 1;
                } else {
                    prop_assert!(matches!(result, Err(WalletError::InvalidInput(_))));
                }
            }
            Op::Resolve {
                target,
                approved,
                by_admin,
            } => {
                let (id, at) = model.target(&target);
                let actor = if by_admin { &admin } else { &customers[0] };
                let result = engine.resolve_top_up(actor, id, approved).await;

                match at {
                    _ if !by_admin => {
                        prop_assert!(matches!(result, Err(WalletError::Unauthorized { .. })), "expected Unauthorized, got {:?}", result);
                    }
                    Some(at) if model.issued[at].status == TransactionStatus::Pending => {
                        prop_assert!(result.is_ok());
                        let issued = &mut model.issued[at];
                        if approved {
                            issued.status = TransactionStatus::Completed;
                            model.points[issued.customer] += issued.amount;
                        } else {
                            issued.status = TransactionStatus::Rejected;
                        }
                    }
                    _ => {
                        prop_assert!(matches!(
                            result,
                            Err(WalletError::NotFoundOrAlreadyProcessed(got)) if got == id
                        ));
                    }
                }
            }
        }

        check_ledger(&engine, &customers, &admin, &model).await?;
    }

    Ok(())
}

async fn check_ledger(
    engine: &TopUpEngine<MemoryWalletStore>,
    customers: &[Principal],
    admin: &Principal,
    model: &Model,
) -> Result<(), TestCaseError> {
    let store = engine.store();
    let stored: HashMap<TransactionId, TransactionStatus> = store
        .transactions()
        .await
        .into_iter()
        .map(|tx| (tx.id, tx.status))
        .collect();
    prop_assert_eq!(stored.len(), model.issued.len());

    for issued in &model.issued {
        prop_assert_eq!(stored.get(&issued.id), Some(&issued.status));
    }

    for (customer, principal) in customers.iter().enumerate() {
        let balance = store
            .balance(principal.user_id)
            .await
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .ok_or_else(|| TestCaseError::fail("customer balance missing"))?;
        prop_assert!(balance.points.value() >= 0);
        prop_assert_eq!(balance.points.value(), model.points[customer]);
        prop_assert!(balance.reserved_points.is_zero());
    }

    let notifications = store.notifications().await;
    let to = |user: UserId, id: TransactionId| {
        notifications
            .iter()
            .filter(|n| n.user_id == user && n.reference_id == Some(id))
            .count()
    };
    for issued in &model.issued {
        let owner = customers[issued.customer].user_id;
        let expected = usize::from(issued.status.is_terminal());
        prop_assert_eq!(to(owner, issued.id), expected);
        prop_assert_eq!(to(admin.user_id, issued.id), 1);
    }
    let resolved = model.issued.iter().filter(|i| i.status.is_terminal()).count();
    prop_assert_eq!(notifications.len(), model.requests + resolved);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Across any sequence of requests and resolutions, balances equal the
    /// sum of completed top-ups, resolved statuses never change again, and
    /// every resolution produces exactly one owner notification
    #[test]
    fn prop_operation_sequences_keep_ledger_consistent(
        ops in prop::collection::vec(arb_op(), 1..40)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(check_sequence(ops))?;
    }
}
