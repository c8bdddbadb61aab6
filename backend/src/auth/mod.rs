//! Authentication module: signup, OTP verification, login, and password
//! recovery.
//!
//! This module provides the public interface for the account credential
//! lifecycle, from unverified registration through bearer-token login, plus
//! the authorization middleware protected routes sit behind.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
