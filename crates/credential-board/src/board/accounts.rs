use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{NewUser, RoleProfile, UniversitySummary, UserId};
use super::error::BoardError;
use super::repository::{AccountRepository, RepositoryError};
use super::validate::required_text;
use crate::auth::{AuthContext, AuthError, PasswordHash, Role, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session handed back on register/login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub user_id: UserId,
    pub role: Role,
    pub name: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Registration, login, and the university directory.
pub struct AccountService<S> {
    store: Arc<S>,
    sessions: SessionStore,
}

impl<S> AccountService<S>
where
    S: AccountRepository + 'static,
{
    pub fn new(store: Arc<S>, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    pub fn register(&self, request: RegistrationRequest) -> Result<SessionGrant, BoardError> {
        let email = normalize_email(&request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BoardError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let name = required_text("name", &request.name)?;

        if self.store.find_user_by_email(&email)?.is_some() {
            return Err(BoardError::EmailTaken);
        }

        let account = self
            .store
            .insert_user(NewUser {
                email,
                password: PasswordHash::new(&request.password),
                profile: RoleProfile::new(request.role, name),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => BoardError::EmailTaken,
                other => BoardError::Repository(other),
            })?;

        info!(user_id = %account.id, role = %account.role(), "account registered");
        self.grant(account.id, account.role(), account.display_name().to_string())
    }

    pub fn login(&self, request: LoginRequest) -> Result<SessionGrant, BoardError> {
        let account = self
            .store
            .find_user_by_email(request.email.trim())?
            .filter(|account| account.password.verify(&request.password));

        match account {
            Some(account) => {
                self.grant(account.id, account.role(), account.display_name().to_string())
            }
            None => {
                warn!("login rejected");
                Err(AuthError::BadCredentials.into())
            }
        }
    }

    pub fn logout(&self, token: &str) -> Result<(), BoardError> {
        if self.sessions.revoke(token)? {
            Ok(())
        } else {
            Err(AuthError::InvalidToken.into())
        }
    }

    pub fn resolve(&self, token: &str) -> Result<AuthContext, BoardError> {
        Ok(self.sessions.resolve(token)?)
    }

    /// Universities an employer can address; any authenticated caller may list them.
    pub fn universities(&self, _caller: &AuthContext) -> Result<Vec<UniversitySummary>, BoardError> {
        Ok(self
            .store
            .universities()?
            .into_iter()
            .map(|account| UniversitySummary {
                id: account.id,
                name: account.display_name().to_string(),
            })
            .collect())
    }

    fn grant(&self, user_id: UserId, role: Role, name: String) -> Result<SessionGrant, BoardError> {
        let issued = self.sessions.issue(user_id, role)?;
        Ok(SessionGrant {
            user_id,
            role,
            name,
            access_token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

fn normalize_email(raw: &str) -> Result<String, BoardError> {
    let email = raw.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_string())
        }
        _ => Err(BoardError::validation("email must look like name@domain")),
    }
}
