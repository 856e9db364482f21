//! Balance reads and credits inside a wallet unit of work.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect, sea_query::Expr};
use tracing::debug;

use pointly_core::wallet::ledger::ensure_creditable;
use pointly_core::wallet::{Balance, LedgerStore, StoreError, StoreResult};
use pointly_shared::types::{Points, UserId};

use super::wallet::{PgUnit, PgWalletStore, backend, balance_from_model};
use crate::entities::user_balances;

#[async_trait]
impl LedgerStore for PgWalletStore {
    async fn get_balance(&self, unit: &PgUnit, user_id: UserId) -> StoreResult<Option<Balance>> {
        user_balances::Entity::find_by_id(user_id.into_inner())
            .one(unit.txn())
            .await
            .map_err(backend)?
            .map(balance_from_model)
            .transpose()
    }

    /// Locks the balance row, rejects a credit that would overflow it, then
    /// issues `points = points + amount` as a single statement so concurrent
    /// credits to the same user never lose an update.
    async fn credit_points(&self, unit: &PgUnit, user_id: UserId, amount: Points) -> StoreResult<()> {
        ensure_creditable(amount)?;

        let current = user_balances::Entity::find_by_id(user_id.into_inner())
            .lock_exclusive()
            .one(unit.txn())
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::MissingRow(format!("balance for user {user_id}")))?;
        balance_from_model(current)?.credited(amount)?;

        let result = user_balances::Entity::update_many()
            .col_expr(
                user_balances::Column::Points,
                Expr::col(user_balances::Column::Points).add(amount.value()),
            )
            .col_expr(user_balances::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user_balances::Column::UserId.eq(user_id.into_inner()))
            .exec(unit.txn())
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::MissingRow(format!("balance for user {user_id}")));
        }

        debug!(user_id = %user_id, amount = amount.value(), "Points credited");
        Ok(())
    }
}
