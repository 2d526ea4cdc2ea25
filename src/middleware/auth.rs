use axum::{extract::FromRequestParts, http::header};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    entity::users::Entity as Users, error::AppError, models::ROLE_ADMIN,
    services::auth_service::decode_token, state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub session_id: Uuid,
}

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Only the owner of a resource may act on it.
pub fn authorize(actor_id: Uuid, owner_id: Uuid) -> Access {
    if actor_id == owner_id {
        Access::Allow
    } else {
        Access::Deny
    }
}

pub fn ensure_owner(user: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    match authorize(user.user_id, owner_id) {
        Access::Allow => Ok(()),
        Access::Deny => Err(AppError::Forbidden),
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let claims = decode_token(&state.config.jwt_secret, token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AppError::Unauthorized("Invalid session id in token".into()))?;

        let mut user = AuthUser {
            user_id,
            role: claims.role,
            session_id,
        };

        // A deleted or expired session invalidates the token.
        state.sessions.load(&state.orm, &user).await?;

        user.role = Users::find_by_id(user.user_id)
            .one(&state.orm)
            .await?
            .map(|u| u.role)
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

        Ok(user)
    }
}
