use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::{repo_types::User, services::current_user};
use crate::{error::ApiError, state::AppState};

/// Resolves `Authorization: Bearer <access token>` to a stored user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
            })
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let user = current_user(state.users.as_ref(), &state.jwt, token.trim()).await?;
        Ok(CurrentUser(user))
    }
}
