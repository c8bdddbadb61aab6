//! Password hashing and verification.
//!
//! Wraps bcrypt: the per-call random salt and the work factor are embedded in
//! the hash output, so verification needs no separate salt storage and the
//! same plaintext hashes differently on every call.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{hash, verify};

// Valid bcrypt work-factor range.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

pub struct CredentialService {
    cost: u32,
}

impl CredentialService {
    /// Creates the service with the configured work factor.
    ///
    /// The cost is validated here, at startup, so an out-of-range value
    /// prevents the server from accepting traffic at all.
    pub fn new(cost: u32) -> ServiceResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ServiceError::configuration(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )));
        }
        Ok(Self { cost })
    }

    /// Hashes a plaintext password for storage.
    pub fn hash(&self, password: &str) -> ServiceResult<String> {
        hash(password, self.cost)
            .map_err(|e| ServiceError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// A malformed hash is not an error: it simply never matches.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CredentialService {
        // Minimum cost keeps the tests fast.
        CredentialService::new(MIN_COST).unwrap()
    }

    #[test]
    fn rejects_out_of_range_cost() {
        assert!(matches!(
            CredentialService::new(3),
            Err(ServiceError::Configuration { .. })
        ));
        assert!(matches!(
            CredentialService::new(32),
            Err(ServiceError::Configuration { .. })
        ));
        assert!(CredentialService::new(12).is_ok());
    }

    #[test]
    fn same_plaintext_hashes_differently_but_both_verify() {
        let svc = service();
        let a = svc.hash("password1").unwrap();
        let b = svc.hash("password1").unwrap();

        assert_ne!(a, b);
        assert!(svc.verify("password1", &a));
        assert!(svc.verify("password1", &b));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let svc = service();
        let hashed = svc.hash("password1").unwrap();
        assert!(!svc.verify("password2", &hashed));
    }

    #[test]
    fn hash_is_never_the_plaintext() {
        let svc = service();
        let hashed = svc.hash("password1").unwrap();
        assert_ne!(hashed, "password1");
    }

    #[test]
    fn malformed_hash_returns_false_not_error() {
        let svc = service();
        assert!(!svc.verify("password1", "not-a-bcrypt-hash"));
        assert!(!svc.verify("password1", ""));
    }
}
