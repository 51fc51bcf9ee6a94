//! Certificate fingerprints for verified degree records.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of
//! `student_name|institution_name|degree|year`. It binds the four identity fields of a
//! verification record together so a later recomputation can detect edits. It carries no
//! secret: anyone able to rewrite the stored fields can also rewrite the stored fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const FINGERPRINT_HEX_LEN: usize = 64;

const FIELD_DELIMITER: char = '|';

/// Compute the fingerprint for a certificate. Values are hashed exactly as supplied.
pub fn compute_fingerprint(
    student_name: &str,
    institution_name: &str,
    degree: &str,
    year: i32,
) -> String {
    let canonical = format!(
        "{student_name}{FIELD_DELIMITER}{institution_name}{FIELD_DELIMITER}{degree}{FIELD_DELIMITER}{year}"
    );
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the fingerprint and compare it byte-for-byte with the stored value.
///
/// A missing or empty stored fingerprint never verifies.
pub fn verify_fingerprint(
    stored_fingerprint: Option<&str>,
    student_name: &str,
    institution_name: &str,
    degree: &str,
    year: i32,
) -> bool {
    match stored_fingerprint {
        Some(stored) if !stored.is_empty() => {
            stored.as_bytes()
                == compute_fingerprint(student_name, institution_name, degree, year).as_bytes()
        }
        _ => false,
    }
}

/// Whether `candidate` has the shape of a fingerprint (64 lowercase hex characters).
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == FINGERPRINT_HEX_LEN
        && candidate
            .bytes()
            .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
}

/// The four identity fields a fingerprint covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateFields {
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub year: i32,
}

impl CertificateFields {
    pub fn fingerprint(&self) -> String {
        compute_fingerprint(
            &self.student_name,
            &self.institution_name,
            &self.degree,
            self.year,
        )
    }

    pub fn matches(&self, stored_fingerprint: Option<&str>) -> bool {
        verify_fingerprint(
            stored_fingerprint,
            &self.student_name,
            &self.institution_name,
            &self.degree,
            self.year,
        )
    }
}
