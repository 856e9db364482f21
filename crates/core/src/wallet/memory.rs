//! In-process wallet store.
//!
//! Units of work are serialised by an async mutex: `begin` takes the lock
//! and holds it until the unit commits or rolls back. Writes are staged on a
//! private copy of the state and published only on commit, so a failed or
//! abandoned unit leaves nothing behind. A one-shot [`FailPoint`] can be armed
//! to make a single store call fail, which is how atomicity is exercised in
//! tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use pointly_shared::types::{
    NotificationId, PageRequest, PageResponse, Points, TransactionId, UserId,
};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::wallet::error::{StoreError, StoreResult};
use crate::wallet::ledger::{Balance, ensure_creditable};
use crate::wallet::notification::NotificationDraft;
use crate::wallet::service::TopUpService;
use crate::wallet::store::{
    LedgerStore, NotificationStore, TransactionStore, UnitOfWork, UnitOfWorkSource, WalletQueries,
};
use crate::wallet::types::{
    NewTransaction, Notification, Role, Transaction, TransactionStatus, TransactionType,
};

/// Store calls that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `TransactionStore::insert`
    Insert,
    /// `TransactionStore::get_pending_by_id`
    GetPendingById,
    /// `TransactionStore::transition_status`
    TransitionStatus,
    /// `LedgerStore::credit_points`
    CreditPoints,
    /// `LedgerStore::get_balance`
    GetBalance,
    /// `NotificationStore::notify_user`
    NotifyUser,
    /// `NotificationStore::notify_by_role`
    NotifyByRole,
    /// `UnitOfWork::commit`
    Commit,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    roles: HashMap<UserId, Role>,
    balances: HashMap<UserId, Balance>,
    transactions: BTreeMap<TransactionId, Transaction>,
    notifications: Vec<Notification>,
    last_transaction_id: i64,
    last_notification_id: i64,
}

impl MemoryState {
    fn push_notification(&mut self, user_id: UserId, draft: &NotificationDraft) -> NotificationId {
        self.last_notification_id += 1;
        let id = NotificationId(self.last_notification_id);
        self.notifications.push(Notification {
            id,
            user_id,
            title: draft.title.clone(),
            message: draft.message.clone(),
            kind: draft.kind.clone(),
            reference_id: draft.reference_id,
            is_read: false,
            created_at: Utc::now(),
        });
        id
    }
}

type FailSlot = Arc<Mutex<Option<FailPoint>>>;

fn trip(slot: &FailSlot, point: FailPoint) -> StoreResult<()> {
    let mut armed = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if *armed == Some(point) {
        *armed = None;
        return Err(StoreError::Backend(format!("injected failure at {point:?}")));
    }
    Ok(())
}

fn page_of<T>(mut rows: Vec<T>, page: PageRequest) -> PageResponse<T> {
    let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let data = if offset >= rows.len() {
        Vec::new()
    } else {
        rows.drain(offset..).take(limit).collect()
    };
    PageResponse::new(data, page, total)
}

/// Wallet store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWalletStore {
    state: Arc<tokio::sync::Mutex<MemoryState>>,
    fail: FailSlot,
}

impl MemoryWalletStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with an empty balance and returns its id.
    pub async fn add_user(&self, role: Role) -> UserId {
        let user_id = UserId::new();
        let mut state = self.state.lock().await;
        state.roles.insert(user_id, role);
        state.balances.insert(user_id, Balance::empty(user_id));
        user_id
    }

    /// Overwrites a user's balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::MissingRow` if the user was never added
    /// - `StoreError::InvariantViolation` if either value is negative
    pub async fn set_balance(&self, user_id: UserId, points: i64, reserved_points: i64) -> StoreResult<()> {
        let balance = Balance::from_raw(user_id, points, reserved_points)?;
        let mut state = self.state.lock().await;
        let slot = state
            .balances
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::MissingRow(format!("balance for user {user_id}")))?;
        *slot = balance;
        Ok(())
    }

    /// Arms a fail point; the next matching call fails and disarms it.
    pub fn fail_at(&self, point: FailPoint) {
        *self.fail.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    /// Every committed transaction in id order.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.values().cloned().collect()
    }

    /// Every committed notification in creation order.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }
}

struct Working {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

/// Unit of work for [`MemoryWalletStore`].
pub struct MemoryUnit {
    working: Mutex<Working>,
    fail: FailSlot,
}

impl MemoryUnit {
    fn with_staged<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        let mut working = self.working.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut working.staged)
    }
}

impl std::fmt::Debug for MemoryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUnit").finish_non_exhaustive()
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn commit(self) -> StoreResult<()> {
        trip(&self.fail, FailPoint::Commit)?;
        let Working { mut guard, staged } = self
            .working
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        debug!("Discarding staged writes");
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkSource for MemoryWalletStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> StoreResult<MemoryUnit> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = (*guard).clone();
        Ok(MemoryUnit {
            working: Mutex::new(Working { guard, staged }),
            fail: Arc::clone(&self.fail),
        })
    }
}

#[async_trait]
impl LedgerStore for MemoryWalletStore {
    async fn get_balance(&self, unit: &MemoryUnit, user_id: UserId) -> StoreResult<Option<Balance>> {
        trip(&self.fail, FailPoint::GetBalance)?;
        Ok(unit.with_staged(|state| state.balances.get(&user_id).copied()))
    }

    async fn credit_points(&self, unit: &MemoryUnit, user_id: UserId, amount: Points) -> StoreResult<()> {
        trip(&self.fail, FailPoint::CreditPoints)?;
        ensure_creditable(amount)?;
        unit.with_staged(|state| -> StoreResult<()> {
            let balance = state
                .balances
                .get_mut(&user_id)
                .ok_or_else(|| StoreError::MissingRow(format!("balance for user {user_id}")))?;
            *balance = balance.credited(amount)?;
            Ok(())
        })
    }
}

#[async_trait]
impl TransactionStore for MemoryWalletStore {
    async fn insert(&self, unit: &MemoryUnit, transaction: NewTransaction) -> StoreResult<TransactionId> {
        trip(&self.fail, FailPoint::Insert)?;
        if transaction.amount.is_zero() {
            return Err(StoreError::InvalidAmount(0));
        }
        unit.with_staged(|state| {
            if !state.roles.contains_key(&transaction.user_id) {
                return Err(StoreError::MissingRow(format!(
                    "user {}",
                    transaction.user_id
                )));
            }
            state.last_transaction_id += 1;
            let id = TransactionId(state.last_transaction_id);
            let now = Utc::now();
            state.transactions.insert(
                id,
                Transaction {
                    id,
                    user_id: transaction.user_id,
                    kind: transaction.kind,
                    amount: transaction.amount,
                    status: TransactionStatus::Pending,
                    payment_method: transaction.payment_method,
                    receipt_url: transaction.receipt_url,
                    notes: transaction.notes,
                    created_at: now,
                    updated_at: now,
                },
            );
            Ok(id)
        })
    }

    async fn get_pending_by_id(
        &self,
        unit: &MemoryUnit,
        id: TransactionId,
        kind: TransactionType,
    ) -> StoreResult<Option<Transaction>> {
        trip(&self.fail, FailPoint::GetPendingById)?;
        Ok(unit.with_staged(|state| {
            state
                .transactions
                .get(&id)
                .filter(|tx| tx.kind == kind && tx.status == TransactionStatus::Pending)
                .cloned()
        }))
    }

    async fn transition_status(
        &self,
        unit: &MemoryUnit,
        id: TransactionId,
        status: TransactionStatus,
    ) -> StoreResult<bool> {
        trip(&self.fail, FailPoint::TransitionStatus)?;
        Ok(unit.with_staged(|state| match state.transactions.get_mut(&id) {
            Some(tx) if TopUpService::is_valid_transition(tx.status, status) => {
                tx.status = status;
                tx.updated_at = Utc::now();
                true
            }
            _ => false,
        }))
    }
}

#[async_trait]
impl NotificationStore for MemoryWalletStore {
    async fn notify_user(
        &self,
        unit: &MemoryUnit,
        user_id: UserId,
        draft: &NotificationDraft,
    ) -> StoreResult<NotificationId> {
        trip(&self.fail, FailPoint::NotifyUser)?;
        unit.with_staged(|state| {
            if !state.roles.contains_key(&user_id) {
                return Err(StoreError::MissingRow(format!("user {user_id}")));
            }
            Ok(state.push_notification(user_id, draft))
        })
    }

    async fn notify_by_role(&self, unit: &MemoryUnit, role: Role, draft: &NotificationDraft) -> StoreResult<u64> {
        trip(&self.fail, FailPoint::NotifyByRole)?;
        Ok(unit.with_staged(|state| {
            let mut recipients: Vec<UserId> = state
                .roles
                .iter()
                .filter(|(_, r)| **r == role)
                .map(|(id, _)| *id)
                .collect();
            recipients.sort_by_key(|id| id.into_inner());

            for user_id in &recipients {
                state.push_notification(*user_id, draft);
            }
            u64::try_from(recipients.len()).unwrap_or(u64::MAX)
        }))
    }
}

#[async_trait]
impl WalletQueries for MemoryWalletStore {
    async fn balance(&self, user_id: UserId) -> StoreResult<Option<Balance>> {
        Ok(self.state.lock().await.balances.get(&user_id).copied())
    }

    async fn transactions_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Transaction>> {
        let state = self.state.lock().await;
        let rows: Vec<Transaction> = state
            .transactions
            .values()
            .rev()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(rows, page))
    }

    async fn notifications_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Notification>> {
        let state = self.state.lock().await;
        let rows: Vec<Notification> = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(rows, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(n: i64) -> Points {
        Points::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;

        let unit = store.begin().await.unwrap();
        store.credit_points(&unit, user, pts(10)).await.unwrap();
        assert_eq!(
            store.get_balance(&unit, user).await.unwrap().unwrap().points,
            pts(10)
        );
        unit.rollback().await.unwrap();

        assert_eq!(store.balance(user).await.unwrap().unwrap().points, Points::ZERO);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;

        let unit = store.begin().await.unwrap();
        store.credit_points(&unit, user, pts(10)).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(store.balance(user).await.unwrap().unwrap().points, pts(10));
    }

    #[tokio::test]
    async fn test_credit_rejects_zero_and_missing_user() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;
        let unit = store.begin().await.unwrap();

        assert_eq!(
            store.credit_points(&unit, user, Points::ZERO).await,
            Err(StoreError::InvalidAmount(0))
        );
        assert!(matches!(
            store.credit_points(&unit, UserId::new(), pts(5)).await,
            Err(StoreError::MissingRow(_))
        ));
    }

    #[tokio::test]
    async fn test_credit_leaves_reserved_points_alone() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;
        store.set_balance(user, 50, 30).await.unwrap();

        let unit = store.begin().await.unwrap();
        store.credit_points(&unit, user, pts(20)).await.unwrap();
        unit.commit().await.unwrap();

        let balance = store.balance(user).await.unwrap().unwrap();
        assert_eq!(balance.points, pts(70));
        assert_eq!(balance.reserved_points, pts(30));
    }

    #[tokio::test]
    async fn test_transition_is_conditional_on_pending() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;
        let unit = store.begin().await.unwrap();
        let id = store
            .insert(
                &unit,
                NewTransaction {
                    user_id: user,
                    kind: TransactionType::TopUp,
                    amount: pts(5),
                    payment_method: None,
                    receipt_url: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(store
            .transition_status(&unit, id, TransactionStatus::Rejected)
            .await
            .unwrap());
        assert!(!store
            .transition_status(&unit, id, TransactionStatus::Completed)
            .await
            .unwrap());
        assert!(store
            .get_pending_by_id(&unit, id, TransactionType::TopUp)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_fail_point_fires_once() {
        let store = MemoryWalletStore::new();
        let user = store.add_user(Role::Customer).await;
        store.fail_at(FailPoint::GetBalance);

        let unit = store.begin().await.unwrap();
        assert!(matches!(
            store.get_balance(&unit, user).await,
            Err(StoreError::Backend(_))
        ));
        assert!(store.get_balance(&unit, user).await.unwrap().is_some());
    }

    #[test]
    fn test_page_of_slices_and_counts() {
        let rows: Vec<i32> = (1..=5).collect();
        let page = page_of(rows.clone(), PageRequest::new(2, 2));
        assert_eq!(page.data, vec![3, 4]);
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);

        let past_end = page_of(rows, PageRequest::new(9, 2));
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.meta.total, 5);
    }
}
