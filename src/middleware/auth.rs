use axum::{extract::FromRequestParts, http::header};

use crate::{
    error::AppError,
    identity::Session,
    models::Identity,
    state::AppState,
};

/// The bearer of a valid token. Each request gets its own [`Session`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
}

impl AuthUser {
    pub fn session(&self) -> Session {
        Session::signed_in(self.identity.clone())
    }
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
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        };

        let identity = state.auth.verify(token.trim())?;
        Ok(AuthUser { identity })
    }
}
