//! `SeaORM` entity definitions.

pub mod prelude;

pub mod notifications;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod user_balances;
pub mod users;
