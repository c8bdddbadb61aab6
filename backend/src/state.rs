//! Shared application state.
//!
//! Everything in here is built exactly once at startup from the immutable
//! `Config` and is read-only afterwards; handlers receive it through an
//! `Extension<Arc<AppState>>` layer.

use crate::config::Config;
use crate::database::Database;
use crate::errors::ServiceResult;
use crate::services::credential_service::CredentialService;
use crate::services::email_service::{EmailDispatcher, EmailSender, SmtpEmailSender};
use crate::services::otp_service::OtpService;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::jwt::JwtUtils;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub pool: SqlitePool,
    pub credentials: CredentialService,
    pub otp: OtpService,
    pub jwt: JwtUtils,
    pub mailer: EmailDispatcher,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires up every service from configuration. Any constructor rejecting
    /// its settings aborts startup before the listener binds.
    pub fn new(config: &Config, db: &Database) -> ServiceResult<Self> {
        let sender: Arc<dyn EmailSender> = Arc::new(SmtpEmailSender::new(&config.email)?);

        Ok(Self {
            pool: db.pool().clone(),
            credentials: CredentialService::new(config.bcrypt_cost)?,
            otp: OtpService,
            jwt: JwtUtils::new(&config.jwt_secret, config.jwt_expires_in_seconds)?,
            mailer: EmailDispatcher::spawn(sender),
            clock: Arc::new(SystemClock),
        })
    }
}
