use crate::api::AppState;
use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// The signed-in account behind an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

/// Pull the token out of a bearer authorization header
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Authentication("Missing or malformed bearer token".to_string()))?;

        let profile = state.auth.validate(token).await?;
        Ok(AuthUser(profile))
    }
}

/// Like [`AuthUser`], but `None` when the request sends no `Authorization`
/// header at all. A header that is present must carry a valid bearer token.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<UserProfile>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }

        let AuthUser(profile) = AuthUser::from_request_parts(parts, state).await?;
        Ok(OptionalAuthUser(Some(profile)))
    }
}
