//! Business logic services backing the authentication flows.

pub mod credential_service;
pub mod email_service;
pub mod otp_service;
