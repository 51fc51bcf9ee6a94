use axum::http::{header, HeaderMap};
use serde::Serialize;

use super::role::Role;
use crate::board::domain::UserId;

/// Authenticated caller resolved from a bearer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid session token")]
    InvalidToken,
    #[error("session expired")]
    Expired,
    #[error("invalid email or password")]
    BadCredentials,
    #[error("access forbidden: {required} role required, caller is {actual}")]
    Forbidden { required: Role, actual: Role },
    #[error("session store unavailable")]
    Unavailable,
}

/// Reject the call unless the caller holds `required`.
pub fn require_role(required: Role, context: &AuthContext) -> Result<(), AuthError> {
    if context.role == required {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            required,
            actual: context.role,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(role: Role) -> AuthContext {
        AuthContext {
            user_id: UserId(7),
            role,
        }
    }

    #[test]
    fn require_role_accepts_matching_role() {
        assert_eq!(require_role(Role::Employer, &context(Role::Employer)), Ok(()));
    }

    #[test]
    fn require_role_rejects_other_roles() {
        assert_eq!(
            require_role(Role::University, &context(Role::Applicant)),
            Err(AuthError::Forbidden {
                required: Role::University,
                actual: Role::Applicant,
            })
        );
    }

    #[test]
    fn bearer_token_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Ok("abc123"));
    }

    #[test]
    fn bearer_token_rejects_missing_and_foreign_schemes() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));
    }
}
