//! Core wallet logic for Pointly.
//!
//! This crate contains the top-up workflow with ZERO web or database
//! dependencies. Domain types, the transaction state machine, the storage
//! contracts and the engine that drives them all live here; concrete
//! storage is plugged in through the traits in [`wallet::store`].
//!
//! # Modules
//!
//! - `wallet` - Points ledger, top-up lifecycle and notifications

pub mod wallet;
