//! Eligibility policy for fetched records.
//!
//! A record is kept only when it is licensed for reuse (public domain) and
//! has a primary image URL. Both checks are pure.

use std::fmt;

use super::record::RawRecord;

/// Why a record was rejected by the eligibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The public-domain flag is absent or false.
    NotPublicDomain,
    /// The primary image URL is absent or empty.
    NoPrimaryImage,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPublicDomain => write!(f, "not public domain"),
            Self::NoPrimaryImage => write!(f, "no image"),
        }
    }
}

/// Applies the eligibility checks in order and names the first that fails.
///
/// # Errors
///
/// Returns the [`Ineligibility`] reason when the record must be skipped.
pub fn check_eligibility(record: &RawRecord) -> Result<(), Ineligibility> {
    if record.is_public_domain != Some(true) {
        return Err(Ineligibility::NotPublicDomain);
    }
    if record
        .primary_image
        .as_deref()
        .is_none_or(|url| url.trim().is_empty())
    {
        return Err(Ineligibility::NoPrimaryImage);
    }
    Ok(())
}

/// Returns true if the record passes every eligibility check.
#[must_use]
pub fn is_eligible(record: &RawRecord) -> bool {
    check_eligibility(record).is_ok()
}
