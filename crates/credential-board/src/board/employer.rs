use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::domain::{
    Job, JobApplication, JobId, NewJob, NewVerificationRequest, RoleProfile, UserId,
    VerificationRequest,
};
use super::error::BoardError;
use super::repository::BoardStore;
use super::validate::{graduation_year, required_text, required_verbatim};
use crate::auth::{require_role, AuthContext, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationDraft {
    pub university_id: UserId,
    pub student_name: String,
    pub degree: String,
    pub year: i32,
}

/// Operations available to employer accounts.
pub struct EmployerService<S> {
    store: Arc<S>,
}

impl<S> EmployerService<S>
where
    S: BoardStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn post_job(&self, caller: &AuthContext, draft: JobDraft) -> Result<Job, BoardError> {
        require_role(Role::Employer, caller)?;
        let title = required_text("title", &draft.title)?;

        let job = self.store.insert_job(NewJob {
            employer_id: caller.user_id,
            title,
            description: draft.description,
        })?;
        info!(job_id = %job.id, employer_id = %caller.user_id, "job posted");
        Ok(job)
    }

    pub fn my_jobs(&self, caller: &AuthContext) -> Result<Vec<Job>, BoardError> {
        require_role(Role::Employer, caller)?;
        Ok(self.store.jobs_for_employer(caller.user_id)?)
    }

    /// Applications filed against one of the caller's own jobs.
    pub fn applications_for_job(
        &self,
        caller: &AuthContext,
        job_id: JobId,
    ) -> Result<Vec<JobApplication>, BoardError> {
        require_role(Role::Employer, caller)?;
        match self.store.fetch_job(job_id)? {
            Some(job) if job.employer_id == caller.user_id => {
                Ok(self.store.applications_for_job(job_id)?)
            }
            _ => Err(BoardError::NotFound("job")),
        }
    }

    /// File a PENDING request with the named university. The university's current name is
    /// captured on the request as the issuing institution.
    pub fn request_verification(
        &self,
        caller: &AuthContext,
        draft: VerificationDraft,
    ) -> Result<VerificationRequest, BoardError> {
        require_role(Role::Employer, caller)?;
        let student_name = required_verbatim("student_name", draft.student_name)?;
        let degree = required_verbatim("degree", draft.degree)?;
        let year = graduation_year(draft.year)?;

        let institution_name = match self.store.fetch_user(draft.university_id)? {
            Some(account) => match account.profile {
                RoleProfile::University { name } => name,
                _ => return Err(BoardError::NotFound("university")),
            },
            None => return Err(BoardError::NotFound("university")),
        };

        let request = self.store.insert_request(NewVerificationRequest {
            employer_id: caller.user_id,
            university_id: draft.university_id,
            student_name,
            issuing_institution_name: institution_name,
            degree,
            year,
        })?;
        info!(
            request_id = %request.id,
            employer_id = %caller.user_id,
            university_id = %request.university_id,
            "verification requested"
        );
        Ok(request)
    }

    pub fn my_verification_requests(
        &self,
        caller: &AuthContext,
    ) -> Result<Vec<VerificationRequest>, BoardError> {
        require_role(Role::Employer, caller)?;
        Ok(self.store.requests_for_employer(caller.user_id)?)
    }
}
