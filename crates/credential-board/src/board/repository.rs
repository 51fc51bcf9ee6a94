use std::path::PathBuf;

use super::domain::{
    Job, JobApplication, JobId, NewJob, NewJobApplication, NewUser, NewVerificationRequest,
    RequestId, ResumeRef, UserAccount, UserId, VerificationRequest,
};

/// Accounts and their role profiles.
pub trait AccountRepository: Send + Sync {
    /// Assigns an id. Emails are unique ignoring ASCII case.
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError>;
    fn update_user(&self, user: UserAccount) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn universities(&self) -> Result<Vec<UserAccount>, RepositoryError>;
}

/// Job postings and the applications filed against them.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn jobs_for_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError>;
    /// Conflict when the applicant already applied to the job.
    fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError>;
    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError>;
    fn applications_for_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<JobApplication>, RepositoryError>;
}

/// Verification requests and their decisions.
pub trait VerificationRepository: Send + Sync {
    fn insert_request(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RepositoryError>;
    fn update_request(&self, request: VerificationRequest) -> Result<(), RepositoryError>;
    /// Applies `change` to the stored request while holding the write side of
    /// the store, so concurrent callers observe each other's decisions. The row
    /// is only replaced when `change` succeeds.
    fn transition_request<E, F>(&self, id: RequestId, change: F) -> Result<VerificationRequest, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut VerificationRequest) -> Result<(), E>;
    fn fetch_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, RepositoryError>;
    fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<VerificationRequest>, RepositoryError>;
    fn requests_for_university(
        &self,
        university_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError>;
    fn requests_for_employer(
        &self,
        employer_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError>;
}

/// Everything the board services need from storage.
pub trait BoardStore: AccountRepository + JobRepository + VerificationRepository {}

impl<T> BoardStore for T where T: AccountRepository + JobRepository + VerificationRepository {}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Upload payload handed to a resume store.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub owner: UserId,
    /// Already sanitized, owner-prefixed file name.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Persistence for resume files (filesystem, object storage, ...).
pub trait ResumeStore: Send + Sync {
    fn save(&self, upload: ResumeUpload) -> Result<ResumeRef, ResumeStoreError>;
    /// Deletes a stored resume by the `path` `save` returned. Missing files are not an error.
    fn remove(&self, path: &str) -> Result<(), ResumeStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ResumeStoreError {
    #[error("failed to write resume to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove resume {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("resume storage unavailable: {0}")]
    Unavailable(String),
}
