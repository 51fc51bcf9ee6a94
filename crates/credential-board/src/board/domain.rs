use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{PasswordHash, Role};
use crate::fingerprint::{compute_fingerprint, CertificateFields};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered account; role profiles share it.
    UserId
);
record_id!(JobId);
record_id!(JobApplicationId);
record_id!(RequestId);

/// Role-specific profile. The account's role is whichever variant it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Applicant {
        full_name: String,
        resume: Option<ResumeRef>,
    },
    Employer {
        company_name: String,
    },
    University {
        name: String,
    },
}

impl RoleProfile {
    pub fn new(role: Role, name: String) -> Self {
        match role {
            Role::Applicant => RoleProfile::Applicant {
                full_name: name,
                resume: None,
            },
            Role::Employer => RoleProfile::Employer { company_name: name },
            Role::University => RoleProfile::University { name },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Applicant { .. } => Role::Applicant,
            RoleProfile::Employer { .. } => Role::Employer,
            RoleProfile::University { .. } => Role::University,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            RoleProfile::Applicant { full_name, .. } => full_name,
            RoleProfile::Employer { company_name } => company_name,
            RoleProfile::University { name } => name,
        }
    }
}

/// Pointer to a stored resume file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRef {
    pub path: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Account awaiting an identifier from the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: PasswordHash,
    pub profile: RoleProfile,
}

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub password: PasswordHash,
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn display_name(&self) -> &str {
        self.profile.display_name()
    }
}

/// Directory entry so employers can address verification requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniversitySummary {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: UserId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer_id: UserId,
    pub title: String,
    pub description: String,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJobApplication {
    pub job_id: JobId,
    pub applicant_id: UserId,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: JobApplicationId,
    pub job_id: JobId,
    pub applicant_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
}

/// Externally visible status of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decision state. A fingerprint exists exactly when the request is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    Pending,
    Verified {
        fingerprint: String,
        issued_at: DateTime<Utc>,
    },
    Rejected {
        reason: Option<String>,
        decided_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("verification request already decided ({current})")]
pub struct AlreadyDecided {
    pub current: VerificationStatus,
}

#[derive(Debug, Clone)]
pub struct NewVerificationRequest {
    pub employer_id: UserId,
    pub university_id: UserId,
    pub student_name: String,
    pub issuing_institution_name: String,
    pub degree: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub id: RequestId,
    pub employer_id: UserId,
    pub university_id: UserId,
    pub student_name: String,
    pub issuing_institution_name: String,
    pub degree: String,
    pub year: i32,
    pub requested_at: DateTime<Utc>,
    pub state: VerificationState,
}

impl VerificationRequest {
    pub fn status(&self) -> VerificationStatus {
        match self.state {
            VerificationState::Pending => VerificationStatus::Pending,
            VerificationState::Verified { .. } => VerificationStatus::Verified,
            VerificationState::Rejected { .. } => VerificationStatus::Rejected,
        }
    }

    pub fn fingerprint(&self) -> Option<&str> {
        match &self.state {
            VerificationState::Verified { fingerprint, .. } => Some(fingerprint),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.state {
            VerificationState::Rejected { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            VerificationState::Pending => None,
            VerificationState::Verified { issued_at, .. } => Some(*issued_at),
            VerificationState::Rejected { decided_at, .. } => Some(*decided_at),
        }
    }

    pub fn certificate_fields(&self) -> CertificateFields {
        CertificateFields {
            student_name: self.student_name.clone(),
            institution_name: self.issuing_institution_name.clone(),
            degree: self.degree.clone(),
            year: self.year,
        }
    }

    /// PENDING -> VERIFIED. Computes and returns the fingerprint.
    pub fn verify(&mut self, now: DateTime<Utc>) -> Result<&str, AlreadyDecided> {
        self.ensure_pending()?;
        let fingerprint = compute_fingerprint(
            &self.student_name,
            &self.issuing_institution_name,
            &self.degree,
            self.year,
        );
        self.state = VerificationState::Verified {
            fingerprint,
            issued_at: now,
        };
        Ok(self.fingerprint().unwrap_or_default())
    }

    /// PENDING -> REJECTED.
    pub fn reject(
        &mut self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AlreadyDecided> {
        self.ensure_pending()?;
        self.state = VerificationState::Rejected {
            reason,
            decided_at: now,
        };
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), AlreadyDecided> {
        match self.status() {
            VerificationStatus::Pending => Ok(()),
            current => Err(AlreadyDecided { current }),
        }
    }

    pub fn view(&self) -> VerificationRequestView {
        VerificationRequestView {
            id: self.id,
            employer_id: self.employer_id,
            university_id: self.university_id,
            student_name: self.student_name.clone(),
            institution_name: self.issuing_institution_name.clone(),
            degree: self.degree.clone(),
            year: self.year,
            status: self.status(),
            fingerprint: self.fingerprint().map(str::to_string),
            rejection_reason: self.rejection_reason().map(str::to_string),
            requested_at: self.requested_at,
            decided_at: self.decided_at(),
        }
    }

    /// Public certificate for verified requests, with a freshly recomputed integrity flag.
    pub fn certificate(&self) -> Option<CertificateView> {
        match &self.state {
            VerificationState::Verified {
                fingerprint,
                issued_at,
            } => Some(CertificateView {
                request_id: self.id,
                student_name: self.student_name.clone(),
                institution_name: self.issuing_institution_name.clone(),
                degree: self.degree.clone(),
                year: self.year,
                fingerprint: fingerprint.clone(),
                issued_at: *issued_at,
                integrity_valid: self.certificate_fields().matches(Some(fingerprint)),
            }),
            _ => None,
        }
    }
}

/// Flat wire representation of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRequestView {
    pub id: RequestId,
    pub employer_id: UserId,
    pub university_id: UserId,
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub year: i32,
    pub status: VerificationStatus,
    pub fingerprint: Option<String>,
    pub rejection_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateView {
    pub request_id: RequestId,
    pub student_name: String,
    pub institution_name: String,
    pub degree: String,
    pub year: i32,
    pub fingerprint: String,
    pub issued_at: DateTime<Utc>,
    pub integrity_valid: bool,
}
