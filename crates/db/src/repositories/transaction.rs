//! Wallet transaction rows inside a unit of work.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};

use pointly_core::wallet::{
    NewTransaction, StoreError, StoreResult, Transaction, TransactionStatus, TransactionStore,
    TransactionType,
};
use pointly_shared::types::TransactionId;

use super::wallet::{PgUnit, PgWalletStore, backend, transaction_from_model};
use crate::entities::{sea_orm_active_enums, transactions};

#[async_trait]
impl TransactionStore for PgWalletStore {
    async fn insert(&self, unit: &PgUnit, transaction: NewTransaction) -> StoreResult<TransactionId> {
        if transaction.amount.is_zero() {
            return Err(StoreError::InvalidAmount(0));
        }

        let now = Utc::now().into();
        let model = transactions::ActiveModel {
            id: NotSet,
            user_id: Set(transaction.user_id.into_inner()),
            transaction_type: Set(transaction.kind.into()),
            amount: Set(transaction.amount.value()),
            status: Set(sea_orm_active_enums::TransactionStatus::Pending),
            payment_method: Set(transaction.payment_method),
            receipt_url: Set(transaction.receipt_url),
            notes: Set(transaction.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(unit.txn())
        .await
        .map_err(backend)?;

        Ok(TransactionId(model.id))
    }

    /// Selects the row `FOR UPDATE`; a concurrent resolver blocks here until
    /// this unit ends and then sees the row as no longer pending.
    async fn get_pending_by_id(
        &self,
        unit: &PgUnit,
        id: TransactionId,
        kind: TransactionType,
    ) -> StoreResult<Option<Transaction>> {
        transactions::Entity::find_by_id(id.into_inner())
            .filter(
                transactions::Column::TransactionType
                    .eq(sea_orm_active_enums::TransactionType::from(kind)),
            )
            .filter(
                transactions::Column::Status.eq(sea_orm_active_enums::TransactionStatus::Pending),
            )
            .lock_exclusive()
            .one(unit.txn())
            .await
            .map_err(backend)?
            .map(transaction_from_model)
            .transpose()
    }

    async fn transition_status(
        &self,
        unit: &PgUnit,
        id: TransactionId,
        status: TransactionStatus,
    ) -> StoreResult<bool> {
        let result = transactions::Entity::update_many()
            .set(transactions::ActiveModel {
                status: Set(status.into()),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(transactions::Column::Id.eq(id.into_inner()))
            .filter(
                transactions::Column::Status.eq(sea_orm_active_enums::TransactionStatus::Pending),
            )
            .exec(unit.txn())
            .await
            .map_err(backend)?;

        Ok(result.rows_affected > 0)
    }
}
