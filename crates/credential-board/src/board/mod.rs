//! Job board and degree verification: role services over a shared store.
//!
//! Each role gets its own service. Every gated operation takes the caller's `AuthContext` and
//! checks the role itself via `auth::require_role`; the HTTP layer only resolves the bearer
//! token into that context.

pub mod accounts;
pub mod applicant;
pub mod certificates;
pub mod domain;
pub mod employer;
pub mod error;
pub mod memory;
pub mod repository;
pub mod router;
pub mod university;
mod validate;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::http::HeaderMap;

pub use accounts::{AccountService, LoginRequest, RegistrationRequest, SessionGrant};
pub use applicant::{ApplicantService, ApplicationDraft};
pub use certificates::{CertificateCheck, CertificateCheckResult, CertificateService};
pub use domain::{
    CertificateView, Job, JobApplication, JobApplicationId, JobId, RequestId, ResumeRef,
    RoleProfile, UniversitySummary, UserAccount, UserId, VerificationRequest,
    VerificationRequestView, VerificationState, VerificationStatus,
};
pub use employer::{EmployerService, JobDraft, VerificationDraft};
pub use error::BoardError;
pub use memory::{InMemoryBoardStore, InMemoryResumeStore};
pub use repository::{
    AccountRepository, BoardStore, JobRepository, RepositoryError, ResumeStore,
    ResumeStoreError, ResumeUpload, VerificationRepository,
};
pub use router::board_router;
pub use university::{DecisionRequest, RequestFilter, UniversityService};

use crate::auth::{bearer_token, AuthContext, SessionStore};

/// All role services sharing one store and one session registry.
pub struct Board<S, F> {
    pub accounts: AccountService<S>,
    pub employer: EmployerService<S>,
    pub university: UniversityService<S>,
    pub applicant: ApplicantService<S, F>,
    pub certificates: CertificateService<S>,
}

impl<S, F> Board<S, F>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        resumes: Arc<F>,
        sessions: SessionStore,
        max_resume_bytes: usize,
    ) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), sessions),
            employer: EmployerService::new(store.clone()),
            university: UniversityService::new(store.clone()),
            applicant: ApplicantService::new(store.clone(), resumes, max_resume_bytes),
            certificates: CertificateService::new(store),
        }
    }

    /// Resolve the `Authorization: Bearer` header into the caller's context.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, BoardError> {
        let token = bearer_token(headers)?;
        self.accounts.resolve(token)
    }
}
