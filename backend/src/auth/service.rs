//! Core business logic for the authentication system.
//!
//! `AuthService` drives the account lifecycle: signup issues an OTP challenge
//! (re-issuing it for a still-unverified duplicate), verification promotes the
//! account and mints a bearer token, login checks the password, and the
//! forgot/reset pair rotates the password behind a fresh challenge.

use crate::auth::models::*;
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::state::AppState;
use crate::utils::normalized_email::NormalizedEmail;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

const SIGNUP_SUBJECT: &str = "OTP Verification";
const RESET_SUBJECT: &str = "Password Reset OTP";

pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Registers an account, or re-issues the challenge for a still-unverified
    /// one. An already-verified email is a conflict and sends nothing.
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<()> {
        Self::validate(&request)?;
        let email = NormalizedEmail::parse(&request.email)?;

        let now = self.state.clock.now();
        let password_hash = self.state.credentials.hash(&request.password)?;
        let otp = self.state.otp.issue(now);

        let repo = UserRepository::new(&self.state.pool);
        match repo.get_user_by_email(email.as_str()).await? {
            Some(user) => {
                self.resend_challenge(&repo, user, &password_hash, &otp, now)
                    .await?;
            }
            None => {
                let create = CreateUser {
                    id: Uuid::now_v7().to_string(),
                    name: request.name.clone(),
                    email: email.to_string(),
                    password_hash: password_hash.clone(),
                    otp: otp.clone(),
                };

                match repo.create_user(create, now).await {
                    Ok(_) => {}
                    // Lost the insert race: a concurrent signup created the
                    // row first. Re-fetch once and take the update path.
                    Err(ServiceError::AlreadyExists { .. }) => {
                        let user = repo
                            .get_user_by_email(email.as_str())
                            .await?
                            .ok_or_else(|| ServiceError::not_found("User", email.as_str()))?;
                        self.resend_challenge(&repo, user, &password_hash, &otp, now)
                            .await?;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.state.mailer.dispatch(
            email.as_str(),
            SIGNUP_SUBJECT,
            format!("Your OTP is: {}", otp.code),
        );

        Ok(())
    }

    async fn resend_challenge(
        &self,
        repo: &UserRepository<'_>,
        user: User,
        password_hash: &str,
        otp: &crate::services::otp_service::OtpChallenge,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        if user.is_verified() {
            return Err(ServiceError::already_exists("User", &user.email));
        }
        repo.update_credentials(&user.id, password_hash, otp, now)
            .await?;
        Ok(())
    }

    /// Checks the supplied code against the outstanding challenge; on success
    /// the account becomes verified, the challenge is cleared, and a bearer
    /// token is minted. Re-verifying an already-verified account (resolving a
    /// stale reset challenge) does not demote it.
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> ServiceResult<TokenResponse> {
        Self::validate(&request)?;
        let email = NormalizedEmail::parse(&request.email)?;
        let now = self.state.clock.now();

        let repo = UserRepository::new(&self.state.pool);
        let user = repo
            .get_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email.as_str()))?;

        self.state
            .otp
            .validate(user.pending_otp().as_ref(), &request.otp, now)?;

        let user = repo.mark_verified(&user.id, now).await?;
        let token = self.state.jwt.generate_token(&user.id, now)?;

        Ok(TokenResponse { token })
    }

    /// Authenticates by password and mints a bearer token.
    ///
    /// Verification state is not checked here: an unverified account with a
    /// correct password can log in, matching the original flow.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        Self::validate(&request)?;
        let email = NormalizedEmail::parse(&request.email)?;
        let now = self.state.clock.now();

        let repo = UserRepository::new(&self.state.pool);
        let user = repo
            .get_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email.as_str()))?;

        if !self
            .state
            .credentials
            .verify(&request.password, &user.password_hash)
        {
            return Err(ServiceError::Auth);
        }

        let token = self.state.jwt.generate_token(&user.id, now)?;
        Ok(TokenResponse { token })
    }

    /// Issues a password-reset challenge, overwriting any outstanding OTP so
    /// only the latest code is ever valid.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<()> {
        Self::validate(&request)?;
        let email = NormalizedEmail::parse(&request.email)?;
        let now = self.state.clock.now();

        let repo = UserRepository::new(&self.state.pool);
        let user = repo
            .get_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email.as_str()))?;

        let otp = self.state.otp.issue(now);
        repo.set_otp_challenge(&user.id, &otp, now).await?;

        self.state.mailer.dispatch(
            email.as_str(),
            RESET_SUBJECT,
            format!("Your OTP to reset password is: {}", otp.code),
        );

        Ok(())
    }

    /// Replaces the password once the recovery code checks out. The challenge
    /// is cleared so the same code cannot be replayed; the verification state
    /// is untouched.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        Self::validate(&request)?;
        let email = NormalizedEmail::parse(&request.email)?;
        let now = self.state.clock.now();

        let repo = UserRepository::new(&self.state.pool);
        let user = repo
            .get_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", email.as_str()))?;

        self.state
            .otp
            .validate(user.pending_otp().as_ref(), &request.otp, now)?;

        let password_hash = self.state.credentials.hash(&request.new_password)?;
        repo.replace_password(&user.id, &password_hash, now).await?;

        Ok(())
    }

    fn validate<T: Validate>(payload: &T) -> ServiceResult<()> {
        if let Err(validation_errors) = payload.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }
        Ok(())
    }
}
