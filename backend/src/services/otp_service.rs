//! One-time passcode issuance and validation.
//!
//! Codes are uniform 6-digit strings drawn from `rand::thread_rng`, a
//! ChaCha-based CSPRNG, so they are not predictable across issuances. The
//! validity window is a policy value and lives only here.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::errors::{ServiceError, ServiceResult};

/// How long an issued code stays valid.
const OTP_TTL_MINUTES: i64 = 10;

/// An outstanding challenge: the code and the last instant it is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OtpService;

impl OtpService {
    /// Produces a zero-padded code in `"000000"..="999999"`.
    pub fn generate(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        format!("{n:06}")
    }

    /// Bundles a fresh code with its expiry.
    pub fn issue(&self, now: DateTime<Utc>) -> OtpChallenge {
        OtpChallenge {
            code: self.generate(),
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        }
    }

    /// Checks a supplied code against an outstanding challenge.
    ///
    /// Pure: clearing the challenge on success is the caller's job. Expiry is
    /// inclusive — a code is still accepted at exactly `expires_at`. All
    /// failure cases collapse to `InvalidOtp`.
    pub fn validate(
        &self,
        pending: Option<&OtpChallenge>,
        supplied: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let challenge = pending.ok_or(ServiceError::InvalidOtp)?;

        if !constant_time_eq(challenge.code.as_bytes(), supplied.as_bytes()) {
            return Err(ServiceError::InvalidOtp);
        }

        if now > challenge.expires_at {
            return Err(ServiceError::InvalidOtp);
        }

        Ok(())
    }
}

// Comparison time must not depend on how many leading characters match.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn generated_codes_are_six_zero_padded_digits() {
        let svc = OtpService;
        for _ in 0..200 {
            let code = svc.generate();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "got {code}");
        }
    }

    #[test]
    fn issue_sets_a_ten_minute_window() {
        let svc = OtpService;
        let now = at(1_000_000);
        let challenge = svc.issue(now);
        assert_eq!(challenge.expires_at, now + Duration::minutes(10));
    }

    #[test]
    fn validate_accepts_exact_match_within_window() {
        let svc = OtpService;
        let now = at(1_000_000);
        let challenge = OtpChallenge {
            code: "042137".to_string(),
            expires_at: now + Duration::minutes(10),
        };

        assert!(svc.validate(Some(&challenge), "042137", now).is_ok());
    }

    #[test]
    fn validate_is_inclusive_at_expiry_and_rejects_one_tick_later() {
        let svc = OtpService;
        let expires_at = at(1_000_600);
        let challenge = OtpChallenge {
            code: "042137".to_string(),
            expires_at,
        };

        assert!(svc.validate(Some(&challenge), "042137", expires_at).is_ok());
        assert!(matches!(
            svc.validate(
                Some(&challenge),
                "042137",
                expires_at + Duration::seconds(1)
            ),
            Err(ServiceError::InvalidOtp)
        ));
    }

    #[test]
    fn validate_rejects_mismatch_and_missing_challenge() {
        let svc = OtpService;
        let now = at(1_000_000);
        let challenge = OtpChallenge {
            code: "042137".to_string(),
            expires_at: now + Duration::minutes(10),
        };

        assert!(matches!(
            svc.validate(Some(&challenge), "042138", now),
            Err(ServiceError::InvalidOtp)
        ));
        // No normalization: a shorter or padded variant is not the code.
        assert!(matches!(
            svc.validate(Some(&challenge), "42137", now),
            Err(ServiceError::InvalidOtp)
        ));
        assert!(matches!(
            svc.validate(None, "042137", now),
            Err(ServiceError::InvalidOtp)
        ));
    }
}
