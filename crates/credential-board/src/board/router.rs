use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::accounts::{LoginRequest, RegistrationRequest, SessionGrant};
use super::applicant::ApplicationDraft;
use super::certificates::{CertificateCheck, CertificateCheckResult};
use super::domain::{
    CertificateView, Job, JobApplication, JobId, RequestId, ResumeRef, UniversitySummary,
    VerificationRequestView,
};
use super::employer::{JobDraft, VerificationDraft};
use super::error::BoardError;
use super::repository::{BoardStore, ResumeStore};
use super::university::{DecisionRequest, RequestFilter};
use super::Board;
use crate::auth::bearer_token;

/// Room above the resume limit so oversize uploads reach the service and get its message.
const UPLOAD_SLACK_BYTES: usize = 64 * 1024;

type BoardState<S, F> = State<Arc<Board<S, F>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadParams {
    pub(crate) filename: String,
}

/// Dispatch table for every board endpoint.
pub fn board_router<S, F>(board: Arc<Board<S, F>>) -> Router
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let upload_limit = board
        .applicant
        .max_resume_bytes()
        .saturating_add(UPLOAD_SLACK_BYTES);

    Router::new()
        .route("/auth/register", post(register_handler::<S, F>))
        .route("/auth/login", post(login_handler::<S, F>))
        .route("/auth/logout", post(logout_handler::<S, F>))
        .route("/universities", get(universities_handler::<S, F>))
        .route(
            "/employer/jobs",
            post(post_job_handler::<S, F>).get(my_jobs_handler::<S, F>),
        )
        .route(
            "/employer/jobs/:job_id/applications",
            get(job_applications_handler::<S, F>),
        )
        .route(
            "/employer/request-verification",
            post(request_verification_handler::<S, F>),
        )
        .route(
            "/employer/verification-requests",
            get(employer_requests_handler::<S, F>),
        )
        .route(
            "/university/requests",
            get(university_requests_handler::<S, F>),
        )
        .route(
            "/university/verify-request/:request_id",
            post(decide_handler::<S, F>),
        )
        .route("/applicant/view-jobs", get(view_jobs_handler::<S, F>))
        .route("/applicant/jobs/:job_id/apply", post(apply_handler::<S, F>))
        .route(
            "/applicant/applications",
            get(my_applications_handler::<S, F>),
        )
        .route(
            "/applicant/upload-resume",
            post(upload_resume_handler::<S, F>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/certificates/verify",
            post(check_certificate_handler::<S, F>),
        )
        .route(
            "/certificates/by-fingerprint/:fingerprint",
            get(certificate_by_fingerprint_handler::<S, F>),
        )
        .route(
            "/certificates/:request_id",
            get(certificate_handler::<S, F>),
        )
        .with_state(board)
}

pub(crate) async fn register_handler<S, F>(
    State(board): BoardState<S, F>,
    request: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionGrant>), BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let Json(request) = request?;
    let grant = board.accounts.register(request)?;
    Ok((StatusCode::CREATED, Json(grant)))
}

pub(crate) async fn login_handler<S, F>(
    State(board): BoardState<S, F>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionGrant>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let Json(request) = request?;
    Ok(Json(board.accounts.login(request)?))
}

pub(crate) async fn logout_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Value>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let token = bearer_token(&headers)?;
    board.accounts.logout(token)?;
    Ok(Json(json!({ "status": "logged_out" })))
}

pub(crate) async fn universities_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Vec<UniversitySummary>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    Ok(Json(board.accounts.universities(&caller)?))
}

pub(crate) async fn post_job_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    draft: Result<Json<JobDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Json(draft) = draft?;
    let job = board.employer.post_job(&caller, draft)?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub(crate) async fn my_jobs_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Vec<Job>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    Ok(Json(board.employer.my_jobs(&caller)?))
}

pub(crate) async fn job_applications_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Vec<JobApplication>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Path(job_id) = job_id?;
    Ok(Json(
        board.employer.applications_for_job(&caller, JobId(job_id))?,
    ))
}

pub(crate) async fn request_verification_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    draft: Result<Json<VerificationDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<VerificationRequestView>), BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Json(draft) = draft?;
    let request = board.employer.request_verification(&caller, draft)?;
    Ok((StatusCode::CREATED, Json(request.view())))
}

pub(crate) async fn employer_requests_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Vec<VerificationRequestView>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let requests = board.employer.my_verification_requests(&caller)?;
    Ok(Json(requests.iter().map(|request| request.view()).collect()))
}

pub(crate) async fn university_requests_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    filter: Result<Query<RequestFilter>, QueryRejection>,
) -> Result<Json<Vec<VerificationRequestView>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Query(filter) = filter?;
    let requests = board.university.incoming_requests(&caller, filter)?;
    Ok(Json(requests.iter().map(|request| request.view()).collect()))
}

pub(crate) async fn decide_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    request_id: Result<Path<u64>, PathRejection>,
    decision: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<VerificationRequestView>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Path(request_id) = request_id?;
    let Json(decision) = decision?;
    let request = board
        .university
        .decide(&caller, RequestId(request_id), decision)?;
    Ok(Json(request.view()))
}

pub(crate) async fn view_jobs_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Vec<Job>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    Ok(Json(board.applicant.list_jobs(&caller)?))
}

pub(crate) async fn apply_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
    draft: Result<Json<ApplicationDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<JobApplication>), BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Path(job_id) = job_id?;
    let Json(draft) = draft?;
    let application = board.applicant.apply(&caller, JobId(job_id), draft)?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub(crate) async fn my_applications_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
) -> Result<Json<Vec<JobApplication>>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    Ok(Json(board.applicant.my_applications(&caller)?))
}

pub(crate) async fn upload_resume_handler<S, F>(
    State(board): BoardState<S, F>,
    headers: HeaderMap,
    params: Result<Query<UploadParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ResumeRef>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let caller = board.authenticate(&headers)?;
    let Query(params) = params?;
    let stored = board
        .applicant
        .upload_resume(&caller, &params.filename, body.to_vec())?;
    Ok(Json(stored))
}

pub(crate) async fn certificate_handler<S, F>(
    State(board): BoardState<S, F>,
    request_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<CertificateView>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let Path(request_id) = request_id?;
    Ok(Json(board.certificates.by_request(RequestId(request_id))?))
}

pub(crate) async fn certificate_by_fingerprint_handler<S, F>(
    State(board): BoardState<S, F>,
    fingerprint: Result<Path<String>, PathRejection>,
) -> Result<Json<CertificateView>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let Path(fingerprint) = fingerprint?;
    Ok(Json(board.certificates.by_fingerprint(&fingerprint)?))
}

pub(crate) async fn check_certificate_handler<S, F>(
    State(board): BoardState<S, F>,
    claim: Result<Json<CertificateCheck>, JsonRejection>,
) -> Result<Json<CertificateCheckResult>, BoardError>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    let Json(claim) = claim?;
    Ok(Json(board.certificates.check(&claim)))
}
