//! Database repository for account persistence.
//!
//! Uniqueness by email is enforced here, at write time, by the UNIQUE index:
//! `create_user` surfaces a violation as `AlreadyExists` so the caller can
//! fall back to the update path. All updates are keyed by id and return
//! `NotFound` if the row has gone away.

use crate::database::models::{CreateUser, User, VerificationState};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::otp_service::OtpChallenge;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a fresh unverified account with its initial OTP challenge.
    ///
    /// A UNIQUE violation on the email column maps to `AlreadyExists`; two
    /// concurrent signups for the same email cannot both create a row.
    pub async fn create_user(&self, user: CreateUser, now: DateTime<Utc>) -> ServiceResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, verification_state,
                               otp_code, otp_expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(VerificationState::Unverified)
        .bind(&user.otp.code)
        .bind(user.otp.expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::already_exists("User", &user.email)
            } else {
                e.into()
            }
        })?;

        Ok(created)
    }

    /// Retrieves an account by its normalized email.
    pub async fn get_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves an account by its unique identifier.
    pub async fn get_user_by_id(&self, id: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Overwrites the password hash and OTP challenge in one write.
    ///
    /// This is the signup resend path for a still-unverified account.
    pub async fn update_credentials(
        &self,
        id: &str,
        password_hash: &str,
        otp: &OtpChallenge,
        now: DateTime<Utc>,
    ) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = ?, otp_code = ?, otp_expires_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(&otp.code)
        .bind(otp.expires_at)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Replaces any outstanding OTP challenge; only the latest code is valid.
    pub async fn set_otp_challenge(
        &self,
        id: &str,
        otp: &OtpChallenge,
        now: DateTime<Utc>,
    ) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET otp_code = ?, otp_expires_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&otp.code)
        .bind(otp.expires_at)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Marks the account verified and clears the challenge. Idempotent on an
    /// already-verified account.
    pub async fn mark_verified(&self, id: &str, now: DateTime<Utc>) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET verification_state = ?, otp_code = NULL, otp_expires_at = NULL, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(VerificationState::Verified)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Replaces the password hash and clears the challenge; the verification
    /// state is untouched.
    pub async fn replace_password(
        &self,
        id: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = ?, otp_code = NULL, otp_expires_at = NULL, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATOR;
    use chrono::{DateTime, Duration};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap()
    }

    fn sample(id: &str, email: &str) -> CreateUser {
        CreateUser {
            id: id.to_string(),
            name: "Ann".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$fakehash".to_string(),
            otp: OtpChallenge {
                code: "123456".to_string(),
                expires_at: now() + Duration::minutes(10),
            },
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_roundtrip() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create_user(sample("u1", "ann@x.com"), now()).await.unwrap();
        assert_eq!(created.verification_state, VerificationState::Unverified);
        assert_eq!(created.pending_otp().unwrap().code, "123456");

        let by_email = repo.get_user_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, "u1");
        let by_id = repo.get_user_by_id("u1").await.unwrap().unwrap();
        assert_eq!(by_id.email, "ann@x.com");
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_already_exists() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);

        repo.create_user(sample("u1", "ann@x.com"), now()).await.unwrap();
        let err = repo
            .create_user(sample("u2", "ann@x.com"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn updates_on_missing_row_are_not_found() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);
        let otp = OtpChallenge {
            code: "000000".to_string(),
            expires_at: now(),
        };

        assert!(matches!(
            repo.mark_verified("nope", now()).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            repo.set_otp_challenge("nope", &otp, now()).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            repo.replace_password("nope", "hash", now()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn mark_verified_clears_challenge() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);

        repo.create_user(sample("u1", "ann@x.com"), now()).await.unwrap();
        let user = repo.mark_verified("u1", now()).await.unwrap();

        assert!(user.is_verified());
        assert!(user.pending_otp().is_none());
    }
}
