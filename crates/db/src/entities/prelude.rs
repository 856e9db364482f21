//! Entity re-exports.

pub use super::notifications::Entity as Notifications;
pub use super::transactions::Entity as Transactions;
pub use super::user_balances::Entity as UserBalances;
pub use super::users::Entity as Users;
