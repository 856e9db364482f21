//! Notification rows inside a unit of work.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use pointly_core::wallet::{NotificationDraft, NotificationStore, Role, StoreResult};
use pointly_shared::types::{NotificationId, UserId};

use super::wallet::{PgUnit, PgWalletStore, backend};
use crate::entities::{notifications, sea_orm_active_enums::UserRole, users};

fn draft_model(user_id: Uuid, draft: &NotificationDraft) -> notifications::ActiveModel {
    notifications::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        title: Set(draft.title.clone()),
        message: Set(draft.message.clone()),
        notification_type: Set(draft.kind.clone()),
        reference_id: Set(draft.reference_id.map(|id| id.into_inner())),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    }
}

#[async_trait]
impl NotificationStore for PgWalletStore {
    async fn notify_user(
        &self,
        unit: &PgUnit,
        user_id: UserId,
        draft: &NotificationDraft,
    ) -> StoreResult<NotificationId> {
        let model = draft_model(user_id.into_inner(), draft)
            .insert(unit.txn())
            .await
            .map_err(backend)?;

        Ok(NotificationId(model.id))
    }

    async fn notify_by_role(&self, unit: &PgUnit, role: Role, draft: &NotificationDraft) -> StoreResult<u64> {
        let recipients: Vec<Uuid> = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Role.eq(UserRole::from(role)))
            .order_by_asc(users::Column::Id)
            .into_tuple()
            .all(unit.txn())
            .await
            .map_err(backend)?;

        if recipients.is_empty() {
            return Ok(0);
        }

        let count = u64::try_from(recipients.len()).unwrap_or(u64::MAX);
        notifications::Entity::insert_many(
            recipients
                .into_iter()
                .map(|user_id| draft_model(user_id, draft)),
        )
        .exec(unit.txn())
        .await
        .map_err(backend)?;

        Ok(count)
    }
}
