//! Token authentication for cart and checkout routes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use document_store::DocumentStore;
use domain::parse_user_id;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

/// Extractor that requires a valid access token.
///
/// Holds the user the token was issued for.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl RequireAuth {
    /// Resolves the user a request acts on.
    ///
    /// A `userID` query parameter is optional; when present it must parse and
    /// name the token's own user.
    pub fn resolve(&self, requested: Option<&str>) -> Result<UserId, ApiError> {
        let Some(raw) = requested.filter(|raw| !raw.is_empty()) else {
            return Ok(self.0);
        };
        let user_id = parse_user_id(raw)?;
        if user_id != self.0 {
            tracing::warn!(token_user = %self.0, %user_id, "token used for another user");
            return Err(ApiError::Forbidden(
                "token does not belong to this user".to_string(),
            ));
        }
        Ok(user_id)
    }
}

impl<S> FromRequestParts<Arc<AppState<S>>> for RequireAuth
where
    S: DocumentStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ApiError::Unauthorized("No Authorization Header Provided".to_string())
            })?;

        let user_id = state
            .accounts
            .verify_token(token)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        Ok(Self(user_id))
    }
}
