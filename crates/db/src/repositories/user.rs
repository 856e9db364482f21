//! User repository for database operations.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use pointly_core::wallet::{Principal, Role};
use pointly_shared::types::UserId;

use crate::entities::{user_balances, users};

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Creates a user together with its empty balance row.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; neither row is kept then.
    pub async fn create(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
    ) -> Result<users::Model, DbErr> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.to_string()),
            full_name: Set(full_name.to_string()),
            role: Set(role.into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        user_balances::ActiveModel {
            user_id: Set(user.id),
            points: Set(0),
            reserved_points: Set(0),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(user)
    }

    /// Resolves the acting principal for a user id.
    ///
    /// This is the database-backed access guard: the role is read from the
    /// `users` table and trusted as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn principal(&self, id: UserId) -> Result<Option<Principal>, DbErr> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|user| Principal::new(UserId::from_uuid(user.id), user.role.into())))
    }
}
