//! Migration widening `transactions.payment_method` to unbounded text.
//!
//! The payment method is a free-form label; any non-blank value accepted by
//! the workflow must be storable.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WIDEN_PAYMENT_METHOD_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Fails if a stored label no longer fits
        db.execute_unprepared(NARROW_PAYMENT_METHOD_SQL).await?;
        Ok(())
    }
}

const WIDEN_PAYMENT_METHOD_SQL: &str = r"
ALTER TABLE transactions ALTER COLUMN payment_method TYPE TEXT;
";

const NARROW_PAYMENT_METHOD_SQL: &str = r"
ALTER TABLE transactions ALTER COLUMN payment_method TYPE VARCHAR(50);
";
