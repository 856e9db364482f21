//! Initial wallet migration.
//!
//! Creates the user, balance, transaction and notification tables together
//! with their enums, checks, indexes and the trigger that freezes resolved
//! transactions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY & BALANCES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(USER_BALANCES_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & NOTIFICATIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Platform roles supplied to the access guard
CREATE TYPE user_role AS ENUM ('customer', 'admin', 'seller');

-- Wallet transaction lifecycle
CREATE TYPE transaction_status AS ENUM ('pending', 'completed', 'rejected');

-- Wallet transaction kinds
CREATE TYPE transaction_type AS ENUM ('top_up', 'payment', 'refund', 'payout');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'customer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Admin fan-out reads users by role
CREATE INDEX idx_users_role ON users(role);
";

const USER_BALANCES_SQL: &str = r"
CREATE TABLE user_balances (
    user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    points BIGINT NOT NULL DEFAULT 0,
    reserved_points BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_points_non_negative CHECK (points >= 0),
    CONSTRAINT chk_reserved_points_non_negative CHECK (reserved_points >= 0)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id BIGSERIAL PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    type transaction_type NOT NULL,
    amount BIGINT NOT NULL,
    status transaction_status NOT NULL DEFAULT 'pending',
    payment_method VARCHAR(50),
    receipt_url TEXT,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_top_up_has_receipt CHECK (
        type <> 'top_up' OR (receipt_url IS NOT NULL AND receipt_url <> '')
    )
);

-- History listing per user
CREATE INDEX idx_transactions_user ON transactions(user_id, id DESC);

-- Admin verification queue
CREATE INDEX idx_transactions_pending ON transactions(type, id) WHERE status = 'pending';
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id BIGSERIAL PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    message TEXT NOT NULL,
    type VARCHAR(50) NOT NULL,
    reference_id BIGINT REFERENCES transactions(id),
    is_read BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notifications_user ON notifications(user_id, id DESC);
CREATE INDEX idx_notifications_unread ON notifications(user_id) WHERE is_read = false;
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: protect_resolved_transactions
-- A transaction leaves pending exactly once; identity columns never change
-- ============================================================
CREATE OR REPLACE FUNCTION protect_resolved_transactions()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status <> 'pending' THEN
        RAISE EXCEPTION 'Cannot modify resolved transaction %', OLD.id;
    END IF;

    IF NEW.amount <> OLD.amount OR NEW.user_id <> OLD.user_id OR NEW.type <> OLD.type THEN
        RAISE EXCEPTION 'Cannot change amount, owner or type of transaction %', OLD.id;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_protect_resolved_transactions
BEFORE UPDATE ON transactions
FOR EACH ROW
EXECUTE FUNCTION protect_resolved_transactions();

-- ============================================================
-- FUNCTION: prevent_transaction_delete
-- Transactions are an audit trail
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_transaction_delete()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Cannot delete transaction %', OLD.id;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_transaction_delete
BEFORE DELETE ON transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_transaction_delete();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- ============================================================

DROP TRIGGER IF EXISTS trg_prevent_transaction_delete ON transactions;
DROP TRIGGER IF EXISTS trg_protect_resolved_transactions ON transactions;
DROP FUNCTION IF EXISTS prevent_transaction_delete();
DROP FUNCTION IF EXISTS protect_resolved_transactions();

DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS user_balances CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS user_role;
";
