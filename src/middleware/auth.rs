//! Bearer-token extractor.

use axum::http::header::AUTHORIZATION;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::UserRecord;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: the user a valid `Authorization: Bearer <jwt>` header belongs to.
#[derive(Clone, Debug)]
pub struct AuthUser(pub UserRecord);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .ok_or_else(|| {
                AppError::TokenInvalid("missing or malformed Authorization header".to_string())
            })?;
        let user = state.accounts().authenticate(token.trim()).await?;
        Ok(AuthUser(user))
    }
}
