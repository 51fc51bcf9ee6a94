use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::domain::{RequestId, VerificationRequest, VerificationStatus};
use super::error::BoardError;
use super::repository::{RepositoryError, VerificationRepository};
use crate::auth::{require_role, AuthContext, Role};

/// University decision on a pending request.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub status: VerificationStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<VerificationStatus>,
}

/// Operations available to university accounts.
pub struct UniversityService<S> {
    store: Arc<S>,
}

impl<S> UniversityService<S>
where
    S: VerificationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Requests addressed to the caller, optionally narrowed to one status.
    pub fn incoming_requests(
        &self,
        caller: &AuthContext,
        filter: RequestFilter,
    ) -> Result<Vec<VerificationRequest>, BoardError> {
        require_role(Role::University, caller)?;
        let requests = self.store.requests_for_university(caller.user_id)?;
        Ok(match filter.status {
            Some(status) => requests
                .into_iter()
                .filter(|request| request.status() == status)
                .collect(),
            None => requests,
        })
    }

    /// Move a PENDING request to VERIFIED (issuing its fingerprint) or REJECTED.
    ///
    /// Requests addressed to another university are reported as not found.
    pub fn decide(
        &self,
        caller: &AuthContext,
        request_id: RequestId,
        decision: DecisionRequest,
    ) -> Result<VerificationRequest, BoardError> {
        require_role(Role::University, caller)?;

        let reason = match decision.status {
            VerificationStatus::Verified => None,
            VerificationStatus::Rejected => decision
                .reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty()),
            VerificationStatus::Pending => {
                return Err(BoardError::validation(
                    "status must be VERIFIED or REJECTED",
                ));
            }
        };

        let now = Utc::now();
        let request = self
            .store
            .transition_request(request_id, |request| {
                if request.university_id != caller.user_id {
                    return Err(BoardError::NotFound("verification request"));
                }
                match decision.status {
                    VerificationStatus::Verified => request.verify(now).map(|_| ())?,
                    _ => request.reject(reason, now)?,
                }
                Ok(())
            })
            .map_err(|err| match err {
                BoardError::Repository(RepositoryError::NotFound) => {
                    BoardError::NotFound("verification request")
                }
                other => other,
            })?;

        info!(
            request_id = %request.id,
            university_id = %caller.user_id,
            status = %request.status(),
            "verification decided"
        );
        Ok(request)
    }
}
