// ABOUTME: Caller identity for API requests
// ABOUTME: Reads the identity headers set by the upstream session layer and gates role-restricted writes

use axum::{extract::FromRequestParts, http::request::Parts};
use opsdesk_access::Caller;
use opsdesk_core::Role;
use tracing::warn;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity of the current request. Missing or unparsable headers yield an
/// anonymous caller; reads then return empty results and writes are refused.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub caller: Caller,
}

impl CurrentUser {
    /// The caller's user id, or `Unauthorized` when none was supplied
    pub fn require_user(&self) -> Result<&str, AppError> {
        self.caller.user_id.as_deref().ok_or(AppError::Unauthorized)
    }

    /// The caller's user id when their role passes `allowed`
    pub fn require_role(
        &self,
        allowed: impl Fn(&Role) -> bool,
        action: &str,
    ) -> Result<&str, AppError> {
        let user_id = self.require_user()?;

        if !self.caller.has_role(allowed) {
            warn!(
                audit = true,
                user_id = user_id,
                role = self.caller.role.map(|r| r.as_str()).unwrap_or("-"),
                "Refused: {}",
                action
            );
            return Err(AppError::Forbidden {
                message: format!("Your role is not allowed to {}", action),
            });
        }

        Ok(user_id)
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_raw(
            header_value(parts, USER_ID_HEADER),
            header_value(parts, USER_ROLE_HEADER),
        );

        Ok(Self { caller })
    }
}
