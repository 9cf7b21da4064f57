//! Dashboard view routes.
//!
//! Expansion state arrives as repeated query parameters, e.g.
//! `/views/financial?months=2024-01&months=2024-02`, and is rebuilt on every
//! request.

use axum::{extract::State, Json};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::gateway::Credential;
use crate::middleware::auth::ActiveCredential;
use crate::services::expansion::ExpansionState;
use crate::services::financial::{self, FinancialView};
use crate::services::instruments::{self, InstrumentsView};
use crate::services::lessons::{self, LessonsView};
use crate::services::overview::{self, OverviewView};
use crate::services::packages::{self, PackageExpansion, PackagesView};
use crate::services::students::{self, StudentsView};
use crate::services::teachers::{self, TeachersView};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    #[serde(default)]
    pub months: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentParams {
    #[serde(default)]
    pub students: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeacherParams {
    #[serde(default)]
    pub teachers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PackageParams {
    #[serde(default)]
    pub names: Vec<String>,
    /// `"{package name}/{student id}"` keys.
    #[serde(default)]
    pub package_students: Vec<String>,
}

/// Pass `result` through, dropping `credential` from the session if the content API rejected it.
async fn settle<T>(
    state: &AppState,
    credential: &Credential,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if result.as_ref().is_err_and(AppError::is_unauthorized) {
        state.session.invalidate(credential).await;
    }
    result
}

/// GET /api/v1/views/overview
pub async fn overview(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
) -> Result<Json<ApiResponse<OverviewView>>, AppError> {
    let result = overview::load(
        &state.client,
        &credential,
        &state.roles,
        state.config.recent_lesson_window_days,
    )
    .await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/financial?months=YYYY-MM
pub async fn financial(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
    Query(params): Query<MonthParams>,
) -> Result<Json<ApiResponse<FinancialView>>, AppError> {
    let months = ExpansionState::from_keys(params.months);
    let result = financial::load(&state.client, &credential, &months).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/lessons?months=YYYY-MM
pub async fn lessons(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
    Query(params): Query<MonthParams>,
) -> Result<Json<ApiResponse<LessonsView>>, AppError> {
    let months = ExpansionState::from_keys(params.months);
    let result = lessons::load(&state.client, &credential, &months).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/students?students={id}
pub async fn students(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
    Query(params): Query<StudentParams>,
) -> Result<Json<ApiResponse<StudentsView>>, AppError> {
    let expanded = ExpansionState::from_keys(params.students);
    let result = students::load(&state.client, &credential, &expanded).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/teachers?teachers={id}
pub async fn teachers(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
    Query(params): Query<TeacherParams>,
) -> Result<Json<ApiResponse<TeachersView>>, AppError> {
    let expanded = ExpansionState::from_keys(params.teachers);
    let result = teachers::load(&state.client, &credential, &state.roles, &expanded).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/packages?names={name}&package_students={name}/{student}
pub async fn packages(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
    Query(params): Query<PackageParams>,
) -> Result<Json<ApiResponse<PackagesView>>, AppError> {
    let expansion = PackageExpansion {
        names: ExpansionState::from_keys(params.names),
        students: ExpansionState::from_keys(params.package_students),
    };
    let result = packages::load(&state.client, &credential, &expansion).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}

/// GET /api/v1/views/instruments
pub async fn instruments(
    State(state): State<AppState>,
    ActiveCredential(credential): ActiveCredential,
) -> Result<Json<ApiResponse<InstrumentsView>>, AppError> {
    let result = instruments::load(&state.client, &credential).await;
    Ok(ApiResponse::success(settle(&state, &credential, result).await?))
}
