//! Session routes: log in to the content API, log out, inspect the session.
//!
//! Login and logout change the credential every viewer reads through, so they
//! require the [`Operator`] secret.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::gateway::CredentialStatus;
use crate::middleware::auth::Operator;
use crate::AppState;

/// Both fields fall back to the configured `CONTENT_API_EMAIL` / `CONTENT_API_PASSWORD`.
/// The body itself may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/v1/auth/login: acquire and install a fresh credential
pub async fn login(
    State(state): State<AppState>,
    _operator: Operator,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<ApiResponse<CredentialStatus>>, AppError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let email = body
        .email
        .or_else(|| state.config.content_api_email.clone())
        .ok_or_else(|| AppError::Validation("email is required".to_string()))?;
    let password = body
        .password
        .or_else(|| state.config.content_api_password.clone())
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

    let credential = state.client.login(&email, &password).await?;
    let status = credential.status();
    state.session.install(credential).await;

    Ok(ApiResponse::success(status))
}

/// POST /api/v1/auth/logout: drop the installed credential
pub async fn logout(
    State(state): State<AppState>,
    _operator: Operator,
) -> Json<ApiResponse<&'static str>> {
    state.session.clear().await;
    tracing::info!("Content API session cleared");
    ApiResponse::success("Logged out successfully")
}

/// GET /api/v1/auth/status
pub async fn status(State(state): State<AppState>) -> Json<ApiResponse<CredentialStatus>> {
    ApiResponse::success(state.session.status().await)
}
