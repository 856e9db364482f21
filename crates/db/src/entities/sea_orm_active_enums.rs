//! `SeaORM` active enums mapped to Postgres enum types.

use pointly_core::wallet::types as core;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "seller")]
    Seller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "top_up")]
    TopUp,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "payout")]
    Payout,
}

impl From<UserRole> for core::Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Customer => Self::Customer,
            UserRole::Admin => Self::Admin,
            UserRole::Seller => Self::Seller,
        }
    }
}

impl From<core::Role> for UserRole {
    fn from(role: core::Role) -> Self {
        match role {
            core::Role::Customer => Self::Customer,
            core::Role::Admin => Self::Admin,
            core::Role::Seller => Self::Seller,
        }
    }
}

impl From<TransactionStatus> for core::TransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<core::TransactionStatus> for TransactionStatus {
    fn from(status: core::TransactionStatus) -> Self {
        match status {
            core::TransactionStatus::Pending => Self::Pending,
            core::TransactionStatus::Completed => Self::Completed,
            core::TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<TransactionType> for core::TransactionType {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::TopUp => Self::TopUp,
            TransactionType::Payment => Self::Payment,
            TransactionType::Refund => Self::Refund,
            TransactionType::Payout => Self::Payout,
        }
    }
}

impl From<core::TransactionType> for TransactionType {
    fn from(kind: core::TransactionType) -> Self {
        match kind {
            core::TransactionType::TopUp => Self::TopUp,
            core::TransactionType::Payment => Self::Payment,
            core::TransactionType::Refund => Self::Refund,
            core::TransactionType::Payout => Self::Payout,
        }
    }
}
