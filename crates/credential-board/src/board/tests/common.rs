use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{AuthContext, Role, SessionStore};
use crate::board::accounts::{RegistrationRequest, SessionGrant};
use crate::board::domain::{
    Job, JobApplication, JobId, NewJob, NewJobApplication, NewUser, NewVerificationRequest,
    RequestId, UserAccount, UserId, VerificationRequest,
};
use crate::board::employer::VerificationDraft;
use crate::board::memory::{InMemoryBoardStore, InMemoryResumeStore};
use crate::board::repository::{
    AccountRepository, JobRepository, RepositoryError, VerificationRepository,
};
use crate::board::{board_router, Board};

pub(super) const MAX_RESUME_BYTES: usize = 1024;

pub(super) type MemoryBoard = Board<InMemoryBoardStore, InMemoryResumeStore>;

pub(super) fn build_board() -> (
    Arc<MemoryBoard>,
    Arc<InMemoryBoardStore>,
    Arc<InMemoryResumeStore>,
) {
    let store = Arc::new(InMemoryBoardStore::default());
    let resumes = Arc::new(InMemoryResumeStore::default());
    let board = Board::new(
        store.clone(),
        resumes.clone(),
        SessionStore::new(Duration::minutes(30)),
        MAX_RESUME_BYTES,
    );
    (Arc::new(board), store, resumes)
}

pub(super) fn registration(role: Role, email: &str, name: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        password: "password123".to_string(),
        role,
        name: name.to_string(),
    }
}

pub(super) fn register(board: &MemoryBoard, role: Role, email: &str, name: &str) -> SessionGrant {
    board
        .accounts
        .register(registration(role, email, name))
        .expect("registration succeeds")
}

pub(super) fn caller(grant: &SessionGrant) -> AuthContext {
    AuthContext {
        user_id: grant.user_id,
        role: grant.role,
    }
}

/// University, employer, and applicant registered against one board.
pub(super) struct Cast {
    pub(super) university: SessionGrant,
    pub(super) employer: SessionGrant,
    pub(super) applicant: SessionGrant,
}

pub(super) fn cast(board: &MemoryBoard) -> Cast {
    Cast {
        university: register(
            board,
            Role::University,
            "admin@university.edu",
            "State Tech University",
        ),
        employer: register(board, Role::Employer, "hr@acme.test", "Acme Corp"),
        applicant: register(board, Role::Applicant, "jane@example.test", "Jane Doe"),
    }
}

pub(super) fn jane_doe_draft(university_id: UserId) -> VerificationDraft {
    VerificationDraft {
        university_id,
        student_name: "Jane Doe".to_string(),
        degree: "B.Sc. Computer Science".to_string(),
        year: 2023,
    }
}

pub(super) const JANE_DOE_FINGERPRINT: &str =
    "468fc9a106a9f1737865b9c71c28530e43c8d1ab5b1020d4f14df36728736389";

pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl AccountRepository for UnavailableStore {
    fn insert_user(&self, _user: NewUser) -> Result<UserAccount, RepositoryError> {
        offline()
    }

    fn update_user(&self, _user: UserAccount) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        offline()
    }

    fn find_user_by_email(&self, _email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        offline()
    }

    fn universities(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        offline()
    }
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: NewJob) -> Result<Job, RepositoryError> {
        offline()
    }

    fn fetch_job(&self, _id: JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn jobs_for_employer(&self, _employer_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn insert_application(
        &self,
        _application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        offline()
    }

    fn applications_for_job(&self, _job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        offline()
    }

    fn applications_for_applicant(
        &self,
        _applicant_id: UserId,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        offline()
    }
}

impl VerificationRepository for UnavailableStore {
    fn insert_request(
        &self,
        _request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RepositoryError> {
        offline()
    }

    fn update_request(&self, _request: VerificationRequest) -> Result<(), RepositoryError> {
        offline()
    }

    fn transition_request<E, F>(&self, _id: RequestId, _change: F) -> Result<VerificationRequest, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut VerificationRequest) -> Result<(), E>,
    {
        Ok(offline()?)
    }

    fn fetch_request(&self, _id: RequestId) -> Result<Option<VerificationRequest>, RepositoryError> {
        offline()
    }

    fn find_by_fingerprint(
        &self,
        _fingerprint: &str,
    ) -> Result<Option<VerificationRequest>, RepositoryError> {
        offline()
    }

    fn requests_for_university(
        &self,
        _university_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        offline()
    }

    fn requests_for_employer(
        &self,
        _employer_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        offline()
    }
}

/// Reads and inserts pass through; profile updates fail as if storage dropped mid-request.
pub(super) struct FrozenProfiles(pub(super) InMemoryBoardStore);

impl AccountRepository for FrozenProfiles {
    fn insert_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError> {
        self.0.insert_user(user)
    }

    fn update_user(&self, _user: UserAccount) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        self.0.fetch_user(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        self.0.find_user_by_email(email)
    }

    fn universities(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        self.0.universities()
    }
}

impl JobRepository for FrozenProfiles {
    fn insert_job(&self, job: NewJob) -> Result<Job, RepositoryError> {
        self.0.insert_job(job)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.0.fetch_job(id)
    }

    fn list_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        self.0.list_jobs()
    }

    fn jobs_for_employer(&self, employer_id: UserId) -> Result<Vec<Job>, RepositoryError> {
        self.0.jobs_for_employer(employer_id)
    }

    fn insert_application(
        &self,
        application: NewJobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        self.0.insert_application(application)
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, RepositoryError> {
        self.0.applications_for_job(job_id)
    }

    fn applications_for_applicant(
        &self,
        applicant_id: UserId,
    ) -> Result<Vec<JobApplication>, RepositoryError> {
        self.0.applications_for_applicant(applicant_id)
    }
}

impl VerificationRepository for FrozenProfiles {
    fn insert_request(
        &self,
        request: NewVerificationRequest,
    ) -> Result<VerificationRequest, RepositoryError> {
        self.0.insert_request(request)
    }

    fn update_request(&self, request: VerificationRequest) -> Result<(), RepositoryError> {
        self.0.update_request(request)
    }

    fn transition_request<E, F>(&self, id: RequestId, change: F) -> Result<VerificationRequest, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&mut VerificationRequest) -> Result<(), E>,
    {
        self.0.transition_request(id, change)
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<VerificationRequest>, RepositoryError> {
        self.0.fetch_request(id)
    }

    fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<VerificationRequest>, RepositoryError> {
        self.0.find_by_fingerprint(fingerprint)
    }

    fn requests_for_university(
        &self,
        university_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        self.0.requests_for_university(university_id)
    }

    fn requests_for_employer(
        &self,
        employer_id: UserId,
    ) -> Result<Vec<VerificationRequest>, RepositoryError> {
        self.0.requests_for_employer(employer_id)
    }
}

pub(super) fn router_for(board: Arc<MemoryBoard>) -> axum::Router {
    board_router(board)
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(super) async fn send(router: &axum::Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
