//! Postgres wallet store.
//!
//! `PgWalletStore` implements the storage contracts of the top-up engine on
//! top of `SeaORM`. A unit of work is one database transaction; the store
//! methods that take a [`PgUnit`] run their statements on it, the read-only
//! queries run on the pooled connection and only see committed data.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::error;

use pointly_core::wallet::{
    Balance, Notification, StoreError, StoreResult, Transaction, UnitOfWork, UnitOfWorkSource,
    WalletQueries,
};
use pointly_shared::types::{
    NotificationId, PageRequest, PageResponse, Points, TransactionId, UserId,
};

use crate::entities::{notifications, transactions, user_balances};

/// Maps a database error onto the storage error the engine understands.
pub(crate) fn backend(err: DbErr) -> StoreError {
    error!(error = %err, "Wallet storage call failed");
    StoreError::Backend(err.to_string())
}

pub(crate) fn balance_from_model(model: user_balances::Model) -> StoreResult<Balance> {
    Balance::from_raw(
        UserId::from_uuid(model.user_id),
        model.points,
        model.reserved_points,
    )
}

pub(crate) fn transaction_from_model(model: transactions::Model) -> StoreResult<Transaction> {
    let amount = Points::positive(model.amount).ok_or_else(|| {
        StoreError::InvariantViolation(format!(
            "transaction {} has non-positive amount ({})",
            model.id, model.amount
        ))
    })?;

    Ok(Transaction {
        id: TransactionId(model.id),
        user_id: UserId::from_uuid(model.user_id),
        kind: model.transaction_type.into(),
        amount,
        status: model.status.into(),
        payment_method: model.payment_method,
        receipt_url: model.receipt_url,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn notification_from_model(model: notifications::Model) -> Notification {
    Notification {
        id: NotificationId(model.id),
        user_id: UserId::from_uuid(model.user_id),
        title: model.title,
        message: model.message,
        kind: model.notification_type,
        reference_id: model.reference_id.map(TransactionId),
        is_read: model.is_read,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// A wallet unit of work: one open database transaction.
#[derive(Debug)]
pub struct PgUnit(DatabaseTransaction);

impl PgUnit {
    /// The underlying database transaction.
    #[must_use]
    pub const fn txn(&self) -> &DatabaseTransaction {
        &self.0
    }
}

#[async_trait]
impl UnitOfWork for PgUnit {
    async fn commit(self) -> StoreResult<()> {
        self.0.commit().await.map_err(backend)
    }

    async fn rollback(self) -> StoreResult<()> {
        self.0.rollback().await.map_err(backend)
    }
}

/// Wallet store backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgWalletStore {
    pub(crate) db: DatabaseConnection,
}

impl PgWalletStore {
    /// Creates a new wallet store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWorkSource for PgWalletStore {
    type Unit = PgUnit;

    async fn begin(&self) -> StoreResult<PgUnit> {
        self.db.begin().await.map(PgUnit).map_err(backend)
    }
}

#[async_trait]
impl WalletQueries for PgWalletStore {
    async fn balance(&self, user_id: UserId) -> StoreResult<Option<Balance>> {
        user_balances::Entity::find_by_id(user_id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(balance_from_model)
            .transpose()
    }

    async fn transactions_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Transaction>> {
        let query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(backend)?;

        let rows = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(backend)?;

        let data = rows
            .into_iter()
            .map(transaction_from_model)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(PageResponse::new(data, page, total))
    }

    async fn notifications_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> StoreResult<PageResponse<Notification>> {
        let query = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(backend)?;

        let rows = query
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(backend)?;

        Ok(PageResponse::new(
            rows.into_iter().map(notification_from_model).collect(),
            page,
            total,
        ))
    }
}
