//! Shared helpers for database integration tests.
//!
//! These tests need a migrated Postgres database. They read its URL from
//! `DATABASE_URL` (or `POINTLY__DATABASE__URL`) and return early when neither
//! is set, so a plain `cargo test` stays green without a database.

#![allow(dead_code)]

use std::env;

use pointly_core::wallet::{Principal, Role};
use pointly_db::UserRepository;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("POINTLY__DATABASE__URL"))
        .ok()
}

/// Connects to the test database, or returns `None` to skip the test.
pub async fn connect() -> Option<DatabaseConnection> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    Some(
        Database::connect(&url)
            .await
            .expect("Failed to connect to database"),
    )
}

/// Creates a user with a unique email and returns it as a principal.
pub async fn create_principal(db: &DatabaseConnection, role: Role) -> Principal {
    let repo = UserRepository::new(db.clone());
    let email = format!("{role}-{}@example.com", Uuid::new_v4());
    let user = repo
        .create(&email, "Test User", role)
        .await
        .expect("Failed to create user");
    repo.principal(pointly_shared::types::UserId::from_uuid(user.id))
        .await
        .expect("Query should succeed")
        .expect("User should exist")
}
