//! Database seeder for Pointly development and testing.
//!
//! Seeds one administrator and one customer with fixed ids so `walletctl`
//! can be driven against a fresh database. Running it twice is harmless.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use pointly_db::entities::{sea_orm_active_enums::UserRole, user_balances, users};
use pointly_shared::AppConfig;

/// Seeded administrator.
const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
/// Seeded customer.
const CUSTOMER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = pointly_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding admin...");
    seed_user(&db, ADMIN_ID, "admin@pointly.dev", "Pointly Admin", UserRole::Admin).await?;

    println!("Seeding customer...");
    seed_user(
        &db,
        CUSTOMER_ID,
        "customer@pointly.dev",
        "Pointly Customer",
        UserRole::Customer,
    )
    .await?;

    println!("Seeding complete!");
    println!("  admin    {ADMIN_ID}");
    println!("  customer {CUSTOMER_ID}");
    Ok(())
}

/// Inserts a user and its empty balance unless the id already exists.
async fn seed_user(
    db: &DatabaseConnection,
    id: Uuid,
    email: &str,
    full_name: &str,
    role: UserRole,
) -> anyhow::Result<()> {
    if users::Entity::find_by_id(id).one(db).await?.is_some() {
        println!("  {email} already exists, skipping...");
        return Ok(());
    }

    let txn = db.begin().await?;
    let now = chrono::Utc::now().into();

    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .with_context(|| format!("Failed to insert {email}"))?;

    user_balances::ActiveModel {
        user_id: Set(id),
        points: Set(0),
        reserved_points: Set(0),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .with_context(|| format!("Failed to open balance for {email}"))?;

    txn.commit().await?;
    println!("  Created {email}");
    Ok(())
}
