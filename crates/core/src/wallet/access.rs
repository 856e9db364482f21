//! Capability-typed access checks.
//!
//! The surrounding application authenticates the caller and hands the engine
//! a [`Principal`]. Mutating operations do not look at the role themselves;
//! they take a capability token that can only be obtained from
//! [`Principal::require_customer`] or [`Principal::require_admin`].

use pointly_shared::types::UserId;
use serde::{Deserialize, Serialize};

use crate::wallet::error::WalletError;
use crate::wallet::types::Role;

/// The acting principal, as supplied by the access guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user.
    pub user_id: UserId,
    /// The user's platform role.
    pub role: Role,
}

/// Proof that the actor may request top-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerCapability {
    user_id: UserId,
}

impl CustomerCapability {
    /// The customer the capability was issued to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Proof that the actor may resolve top-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    user_id: UserId,
}

impl AdminCapability {
    /// The administrator the capability was issued to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Issues a customer capability.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Unauthorized` for any other role.
    pub fn require_customer(&self) -> Result<CustomerCapability, WalletError> {
        match self.role {
            Role::Customer => Ok(CustomerCapability {
                user_id: self.user_id,
            }),
            actual => Err(WalletError::Unauthorized {
                required: Role::Customer,
                actual,
            }),
        }
    }

    /// Issues an admin capability.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::Unauthorized` for any other role.
    pub fn require_admin(&self) -> Result<AdminCapability, WalletError> {
        match self.role {
            Role::Admin => Ok(AdminCapability {
                user_id: self.user_id,
            }),
            actual => Err(WalletError::Unauthorized {
                required: Role::Admin,
                actual,
            }),
        }
    }
}
