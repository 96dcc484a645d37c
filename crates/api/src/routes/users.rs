//! Signup and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{NewUser, UserProfile};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /users/signup — register a new user.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn signup<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<&'static str>), ApiError> {
    state.accounts.signup(req).await?;
    Ok((StatusCode::CREATED, Json("Successfully Signed Up!!")))
}

/// POST /users/login — verify credentials and return the user with fresh tokens.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = state.accounts.login(&req.email, &req.password).await?;
    Ok((StatusCode::ACCEPTED, Json(profile)))
}
