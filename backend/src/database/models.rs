//! Persistent data models for the account entity.

use crate::services::otp_service::OtpChallenge;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Whether the account has proven control of its email address.
///
/// Password resets do not touch this: a reset challenge is represented purely
/// by the presence of an OTP, whatever the verification state.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")] // Store as TEXT in SQLite
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    Unverified,
    Verified,
}

/// An account row. The password hash and any pending OTP never serialize out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verification_state: VerificationState,
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The outstanding challenge, if one exists. Both columns are set
    /// together or cleared together.
    pub fn pending_otp(&self) -> Option<OtpChallenge> {
        match (&self.otp_code, self.otp_expires_at) {
            (Some(code), Some(expires_at)) => Some(OtpChallenge {
                code: code.clone(),
                expires_at,
            }),
            _ => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification_state == VerificationState::Verified
    }
}

/// Data needed to insert a fresh, unverified account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub otp: OtpChallenge,
}
