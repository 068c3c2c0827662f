//! Caller identity extraction.
//!
//! Authentication happens in front of this server. The gateway forwards the
//! authenticated user id in the `X-User-Id` header; these extractors resolve it
//! to a stored user and enforce the role a route needs.

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;
use crate::types::{Role, User, UserStatus};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The identity fact every entry point receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// Extractor that requires any active user
pub struct RequireUser(pub User);

/// Extractor that requires an active admin
pub struct RequireAdmin(pub User);

impl RequireUser {
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller::from(&self.0)
    }
}

impl RequireAdmin {
    #[must_use]
    pub fn caller(&self) -> Caller {
        Caller::from(&self.0)
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingIdentity,
    InvalidIdentity,
    UnknownUser,
    Inactive,
    NotAdmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingIdentity => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidIdentity => (StatusCode::UNAUTHORIZED, "Invalid user identity"),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "Unknown user"),
            AuthError::Inactive => (StatusCode::FORBIDDEN, "User is inactive"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });
        (status, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_caller(parts, state)?;
        Ok(RequireUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_caller(parts, state)?;

        if !Caller::from(&user).is_admin() {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(user))
    }
}

fn resolve_caller(parts: &Parts, state: &Arc<AppState>) -> Result<User, AuthError> {
    let raw = parts
        .headers
        .get(USER_ID_HEADER)
        .ok_or(AuthError::MissingIdentity)?
        .to_str()
        .map_err(|_| AuthError::InvalidIdentity)?;

    let user_id: i64 = raw.trim().parse().map_err(|_| AuthError::InvalidIdentity)?;

    let user = state
        .service
        .store()
        .get_user(user_id)
        .map_err(|e| {
            tracing::error!("Failed to load caller {user_id}: {e}");
            AuthError::InternalError
        })?
        .ok_or(AuthError::UnknownUser)?;

    if user.status != UserStatus::Active {
        return Err(AuthError::Inactive);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "!".to_string(),
            role,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn test_caller_from_user() {
        let caller = Caller::from(&user(Role::Admin));
        assert_eq!(caller.user_id, 7);
        assert!(caller.is_admin());
        assert!(!Caller::from(&user(Role::NormalUser)).is_admin());
    }
}
