use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::domain::{Job, JobApplication, JobId, NewJobApplication, ResumeRef, RoleProfile};
use super::error::BoardError;
use super::repository::{BoardStore, RepositoryError, ResumeStore, ResumeUpload};
use crate::auth::{require_role, AuthContext, Role};

const DOC: &str = "application/msword";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationDraft {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Operations available to applicants, plus the job listing every role can browse.
pub struct ApplicantService<S, F> {
    store: Arc<S>,
    resumes: Arc<F>,
    max_resume_bytes: usize,
}

impl<S, F> ApplicantService<S, F>
where
    S: BoardStore + 'static,
    F: ResumeStore + 'static,
{
    pub fn new(store: Arc<S>, resumes: Arc<F>, max_resume_bytes: usize) -> Self {
        Self {
            store,
            resumes,
            max_resume_bytes,
        }
    }

    pub fn max_resume_bytes(&self) -> usize {
        self.max_resume_bytes
    }

    /// Any authenticated caller may browse postings.
    pub fn list_jobs(&self, _caller: &AuthContext) -> Result<Vec<Job>, BoardError> {
        Ok(self.store.list_jobs()?)
    }

    pub fn apply(
        &self,
        caller: &AuthContext,
        job_id: JobId,
        draft: ApplicationDraft,
    ) -> Result<JobApplication, BoardError> {
        require_role(Role::Applicant, caller)?;
        let cover_letter = draft
            .cover_letter
            .map(|letter| letter.trim().to_string())
            .filter(|letter| !letter.is_empty());

        let application = self
            .store
            .insert_application(NewJobApplication {
                job_id,
                applicant_id: caller.user_id,
                cover_letter,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => BoardError::AlreadyApplied,
                RepositoryError::NotFound => BoardError::NotFound("job"),
                other => BoardError::Repository(other),
            })?;
        info!(job_id = %job_id, applicant_id = %caller.user_id, "application filed");
        Ok(application)
    }

    pub fn my_applications(&self, caller: &AuthContext) -> Result<Vec<JobApplication>, BoardError> {
        require_role(Role::Applicant, caller)?;
        Ok(self.store.applications_for_applicant(caller.user_id)?)
    }

    /// Store a resume and point the applicant's profile at it, replacing any previous one.
    pub fn upload_resume(
        &self,
        caller: &AuthContext,
        original_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ResumeRef, BoardError> {
        require_role(Role::Applicant, caller)?;
        if bytes.is_empty() {
            return Err(BoardError::validation("resume file is empty"));
        }
        if bytes.len() > self.max_resume_bytes {
            return Err(BoardError::PayloadTooLarge {
                limit: self.max_resume_bytes,
            });
        }

        let content_type = resume_content_type(original_name)?;
        let sanitized = sanitize_file_name(original_name);
        if sanitized.is_empty() {
            return Err(BoardError::validation("resume file name is required"));
        }

        let mut account = self
            .store
            .fetch_user(caller.user_id)?
            .ok_or(BoardError::NotFound("applicant"))?;
        let previous = match &account.profile {
            RoleProfile::Applicant { resume, .. } => {
                resume.as_ref().map(|resume| resume.path.clone())
            }
            _ => return Err(BoardError::NotFound("applicant")),
        };

        let stored = self.resumes.save(ResumeUpload {
            owner: caller.user_id,
            file_name: format!("user_{}_{}", caller.user_id, sanitized),
            content_type,
            bytes,
        })?;
        let replaced_in_place = previous.as_deref() == Some(stored.path.as_str());

        if let RoleProfile::Applicant { resume, .. } = &mut account.profile {
            *resume = Some(stored.clone());
        }
        if let Err(err) = self.store.update_user(account) {
            // Same path means the stored profile still references this file.
            if !replaced_in_place {
                self.discard_resume(&stored.path);
            }
            return Err(err.into());
        }
        if let Some(previous) = previous.filter(|_| !replaced_in_place) {
            self.discard_resume(&previous);
        }

        info!(
            applicant_id = %caller.user_id,
            size_bytes = stored.size_bytes,
            "resume uploaded"
        );
        Ok(stored)
    }

    fn discard_resume(&self, path: &str) {
        if let Err(err) = self.resumes.remove(path) {
            warn!(path, error = %err, "failed to remove stale resume");
        }
    }
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`, and drop leading dots so the
/// result cannot traverse or hide.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(|ch: char| ch == '/' || ch == '\\').next().unwrap_or_default();
    let replaced: String = base
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    replaced.trim_start_matches('.').to_string()
}

fn resume_content_type(file_name: &str) -> Result<String, BoardError> {
    match mime_guess::from_path(file_name).first() {
        Some(guessed)
            if guessed == mime::APPLICATION_PDF
                || guessed == mime::TEXT_PLAIN
                || guessed.essence_str() == DOC
                || guessed.essence_str() == DOCX =>
        {
            Ok(guessed.essence_str().to_string())
        }
        Some(guessed) => Err(BoardError::UnsupportedMediaType(
            guessed.essence_str().to_string(),
        )),
        None => Err(BoardError::UnsupportedMediaType(file_name.to_string())),
    }
}
