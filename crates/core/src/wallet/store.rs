//! Storage contracts consumed by the top-up engine.
//!
//! Every mutating call takes the unit of work explicitly. A unit is opened
//! once per engine operation with [`UnitOfWorkSource::begin`] and either
//! committed or rolled back; dropping it without committing discards every
//! write made through it.

use async_trait::async_trait;
use pointly_shared::types::{NotificationId, PageRequest, PageResponse, Points, TransactionId, UserId};

use crate::wallet::error::StoreResult;
use crate::wallet::ledger::Balance;
use crate::wallet::notification::NotificationDraft;
use crate::wallet::types::{
    NewTransaction, Notification, Role, Transaction, TransactionStatus, TransactionType,
};

/// A scoped atomic unit of work.
#[async_trait]
pub trait UnitOfWork: Send + Sync + Sized {
    /// Publishes every write made through this unit.
    async fn commit(self) -> StoreResult<()>;

    /// Discards every write made through this unit.
    async fn rollback(self) -> StoreResult<()>;
}

/// Opens units of work.
#[async_trait]
pub trait UnitOfWorkSource: Send + Sync {
    /// The unit type store calls participate in.
    type Unit: UnitOfWork;

    /// Starts a new unit of work.
    async fn begin(&self) -> StoreResult<Self::Unit>;
}

/// Per-user balances.
#[async_trait]
pub trait LedgerStore: UnitOfWorkSource {
    /// Reads a balance as seen by the unit.
    async fn get_balance(&self, unit: &Self::Unit, user_id: UserId) -> StoreResult<Option<Balance>>;

    /// Adds `amount` to the user's available points as a relative delta.
    ///
    /// Must reject a zero amount with `StoreError::InvalidAmount` and a
    /// missing balance row with `StoreError::MissingRow`.
    async fn credit_points(&self, unit: &Self::Unit, user_id: UserId, amount: Points) -> StoreResult<()>;
}

/// Wallet transaction records.
#[async_trait]
pub trait TransactionStore: UnitOfWorkSource {
    /// Inserts a pending transaction and returns its id.
    async fn insert(&self, unit: &Self::Unit, transaction: NewTransaction) -> StoreResult<TransactionId>;

    /// Fetches a transaction only if it has the given type and is pending.
    ///
    /// Backends that support it lock the row for the rest of the unit.
    async fn get_pending_by_id(
        &self,
        unit: &Self::Unit,
        id: TransactionId,
        kind: TransactionType,
    ) -> StoreResult<Option<Transaction>>;

    /// Moves a pending transaction to `status`.
    ///
    /// This is a conditional write: it returns `false` and changes nothing
    /// when the row is no longer pending.
    async fn transition_status(
        &self,
        unit: &Self::Unit,
        id: TransactionId,
        status: TransactionStatus,
    ) -> StoreResult<bool>;
}

/// User-visible notifications.
#[async_trait]
pub trait NotificationStore: UnitOfWorkSource {
    /// Records one notification for a user.
    async fn notify_user(
        &self,
        unit: &Self::Unit,
        user_id: UserId,
        draft: &NotificationDraft,
    ) -> StoreResult<NotificationId>;

    /// Records one notification per user holding `role`; returns how many.
    async fn notify_by_role(&self, unit: &Self::Unit, role: Role, draft: &NotificationDraft) -> StoreResult<u64>;
}

/// Read-only views for the requesting user. These run outside any unit.
#[async_trait]
pub trait WalletQueries: Send + Sync {
    /// The user's committed balance.
    async fn balance(&self, user_id: UserId) -> StoreResult<Option<Balance>>;

    /// The user's transactions, newest first.
    async fn transactions_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Transaction>>;

    /// The user's notifications, newest first.
    async fn notifications_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Notification>>;
}

/// Everything the engine needs from storage.
pub trait WalletStore: LedgerStore + TransactionStore + NotificationStore + WalletQueries {}

impl<T> WalletStore for T where T: LedgerStore + TransactionStore + NotificationStore + WalletQueries {}
