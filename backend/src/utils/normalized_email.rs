//! Validated, canonicalized email addresses.
//!
//! Email is the uniqueness key for accounts, so it only exists as a typed
//! value once it has been trimmed, case-folded, and checked for shape. Flows
//! never handle a raw email string past their entry point.

use crate::errors::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Folds case and surrounding whitespace, then validates the shape.
    pub fn parse(raw: &str) -> ServiceResult<Self> {
        let folded = raw.trim().to_lowercase();
        if !folded.validate_email() {
            return Err(ServiceError::validation(format!(
                "email: '{raw}' is not a valid email address"
            )));
        }
        Ok(Self(folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_whitespace() {
        let email = NormalizedEmail::parse("  Ann@X.COM ").unwrap();
        assert_eq!(email.as_str(), "ann@x.com");
    }

    #[test]
    fn already_normalized_is_untouched() {
        let email = NormalizedEmail::parse("ann@x.com").unwrap();
        assert_eq!(email.as_str(), "ann@x.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["", "not-an-email", "a@", "@x.com", "a b@x.com"] {
            assert!(
                matches!(
                    NormalizedEmail::parse(raw),
                    Err(ServiceError::Validation { .. })
                ),
                "expected {raw:?} to be rejected"
            );
        }
    }
}
