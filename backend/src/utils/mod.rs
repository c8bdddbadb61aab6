//! Shared utilities: token handling, time source, and validated value types.

pub mod clock;
pub mod jwt;
pub mod normalized_email;
