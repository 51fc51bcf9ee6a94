use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{CertificateView, RequestId, VerificationRequest};
use super::error::BoardError;
use super::repository::VerificationRepository;
use crate::fingerprint::{is_well_formed, verify_fingerprint};

/// Ad-hoc check of a fingerprint against claimed certificate fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateCheck {
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub year: i32,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CertificateCheckResult {
    pub valid: bool,
}

/// Public certificate queries. No authentication.
pub struct CertificateService<S> {
    store: Arc<S>,
}

impl<S> CertificateService<S>
where
    S: VerificationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn by_request(&self, request_id: RequestId) -> Result<CertificateView, BoardError> {
        let request = self.store.fetch_request(request_id)?;
        certificate_of(request)
    }

    pub fn by_fingerprint(&self, fingerprint: &str) -> Result<CertificateView, BoardError> {
        if !is_well_formed(fingerprint) {
            return Err(BoardError::validation(
                "fingerprint must be 64 lowercase hex characters",
            ));
        }
        let request = self.store.find_by_fingerprint(fingerprint)?;
        certificate_of(request)
    }

    /// Recompute from the supplied fields only; storage is not consulted.
    pub fn check(&self, claim: &CertificateCheck) -> CertificateCheckResult {
        let valid = verify_fingerprint(
            claim.fingerprint.as_deref(),
            &claim.student_name,
            &claim.institution_name,
            &claim.degree,
            claim.year,
        );
        CertificateCheckResult { valid }
    }
}

fn certificate_of(request: Option<VerificationRequest>) -> Result<CertificateView, BoardError> {
    let certificate = request
        .and_then(|request| request.certificate())
        .ok_or(BoardError::NotFound("certificate"))?;

    if !certificate.integrity_valid {
        warn!(
            request_id = %certificate.request_id,
            "stored certificate fields no longer match their fingerprint"
        );
    }
    Ok(certificate)
}
