//! HTTP API surface beyond the auth flows.

pub mod common;
pub mod user;
