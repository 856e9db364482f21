//! The platform's internal unit of value.
//!
//! Points are whole numbers. A `Points` value is never negative, so any
//! balance or amount built from it already satisfies the ledger's
//! non-negativity invariant.

use serde::{Deserialize, Serialize};

/// A non-negative quantity of points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Points(i64);

/// Error returned when a raw value cannot be used as points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("points cannot be negative: {0}")]
pub struct NegativePoints(pub i64);

impl Points {
    /// Zero points.
    pub const ZERO: Self = Self(0);

    /// Creates a points value, rejecting negatives.
    #[must_use]
    pub const fn new(value: i64) -> Option<Self> {
        if value >= 0 { Some(Self(value)) } else { None }
    }

    /// Creates a strictly positive points value, as required for credits and
    /// transaction amounts.
    #[must_use]
    pub const fn positive(value: i64) -> Option<Self> {
        if value > 0 { Some(Self(value)) } else { None }
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true if this is zero points.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl TryFrom<i64> for Points {
    type Error = NegativePoints;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NegativePoints(value))
    }
}

impl From<Points> for i64 {
    fn from(points: Points) -> Self {
        points.0
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
