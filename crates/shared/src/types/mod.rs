//! Common types used across the application.

pub mod id;
pub mod pagination;
pub mod points;

pub use id::*;
pub use pagination::{PageMeta, PageRequest, PageResponse};
pub use points::{NegativePoints, Points};
