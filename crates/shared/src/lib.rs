//! Shared types, errors, and configuration for Pointly.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for users, transactions, and notifications
//! - The `Points` unit of value
//! - Pagination types for history listings
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
