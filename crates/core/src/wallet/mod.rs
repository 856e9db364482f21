//! Points wallet top-up verification.
//!
//! A customer submits a top-up with a payment receipt; it is recorded as a
//! pending transaction and every administrator is notified. An administrator
//! then approves it, crediting the customer's balance, or rejects it. Each
//! resolution notifies the customer and happens at most once.
//!
//! # Modules
//!
//! - `types` - Transaction, status, type, role and notification records
//! - `error` - Workflow and storage error types
//! - `access` - Principal and capability tokens
//! - `ledger` - Balance type and credit rules
//! - `notification` - Notification templates
//! - `service` - Request validation and transition decisions
//! - `store` - Storage contracts and unit of work
//! - `engine` - Top-up workflow engine
//! - `memory` - In-process store for tests and tooling

pub mod access;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod notification;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod service_props;

pub use access::{AdminCapability, CustomerCapability, Principal};
pub use engine::TopUpEngine;
pub use error::{StoreError, StoreResult, WalletError};
pub use ledger::Balance;
pub use memory::{FailPoint, MemoryWalletStore};
pub use notification::NotificationDraft;
pub use service::{TopUpRequest, TopUpResolution, TopUpService, ValidatedTopUp};
pub use store::{
    LedgerStore, NotificationStore, TransactionStore, UnitOfWork, UnitOfWorkSource, WalletQueries,
    WalletStore,
};
pub use types::{NewTransaction, Notification, Role, Transaction, TransactionStatus, TransactionType};
