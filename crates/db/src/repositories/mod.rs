//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! The wallet store is split by concern: `ledger`, `transaction` and
//! `notification` each implement one storage contract on [`PgWalletStore`].

pub mod ledger;
pub mod notification;
pub mod transaction;
pub mod user;
pub mod wallet;

pub use user::UserRepository;
pub use wallet::{PgUnit, PgWalletStore};
