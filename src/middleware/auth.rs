//! Request guards for Axum handlers: the installed content API credential,
//! and the operator secret that protects session changes.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::gateway::Credential;
use crate::AppState;

/// The credential currently installed in the session.
///
/// Use as an Axum extractor in handlers that read from the content API:
/// ```ignore
/// async fn handler(ActiveCredential(credential): ActiveCredential) -> impl IntoResponse { ... }
/// ```
/// Rejects with [`AppError::Unauthorized`] when no credential is installed.
#[derive(Debug, Clone)]
pub struct ActiveCredential(pub Credential);

impl FromRequestParts<AppState> for ActiveCredential {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .session
            .current()
            .await
            .map(ActiveCredential)
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller presented `Authorization: Bearer <ADMIN_TOKEN>`.
///
/// Guards the routes that install or clear the shared credential. Rejects
/// with [`AppError::Forbidden`] when no `ADMIN_TOKEN` is configured.
#[derive(Debug, Clone, Copy)]
pub struct Operator;

impl FromRequestParts<AppState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_token.as_deref().ok_or_else(|| {
            AppError::Forbidden("Session management is disabled".to_string())
        })?;

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        if token != expected {
            tracing::warn!("Rejected session change with a wrong operator token");
            return Err(AppError::Unauthorized);
        }

        Ok(Operator)
    }
}
