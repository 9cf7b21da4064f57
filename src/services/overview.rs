//! Home page headline figures.

use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::{RoleKind, RoleMatcher};

use super::aggregator::sum_by;
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub teacher_count: usize,
    pub student_count: usize,
    pub instrument_count: usize,
    /// Lessons starting within the recent window (future lessons included).
    pub monthly_lessons: usize,
    pub total_packages: usize,
    pub total_revenue: f64,
}

pub fn build(
    snapshot: &Snapshot,
    roles: &RoleMatcher,
    now: NaiveDateTime,
    window_days: i64,
) -> OverviewView {
    // A window too large to represent counts every dated lesson.
    let cutoff = Duration::try_days(window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(NaiveDateTime::MIN);
    let count_role = |kind| snapshot.users.iter().filter(|u| roles.is(u, kind)).count();

    OverviewView {
        teacher_count: count_role(RoleKind::Teacher),
        student_count: count_role(RoleKind::Student),
        instrument_count: snapshot.instruments.len(),
        monthly_lessons: snapshot
            .lessons
            .iter()
            .filter(|l| l.start_datetime.is_some_and(|at| at >= cutoff))
            .count(),
        total_packages: snapshot.packages.len(),
        total_revenue: sum_by(&snapshot.payments, |p| p.rate),
    }
}

/// Fetch users, lessons, instruments, packages and payments, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    roles: &RoleMatcher,
    window_days: i64,
) -> Result<OverviewView, AppError> {
    let (users, lessons, instruments, packages, payments) = tokio::try_join!(
        client.users(credential),
        client.lessons(credential),
        client.instruments(credential),
        client.packages(credential),
        client.payments(credential),
    )?;

    let snapshot = Snapshot {
        users,
        lessons,
        instruments,
        packages,
        payments,
        ..Snapshot::default()
    };
    Ok(build(&snapshot, roles, Utc::now().naive_utc(), window_days))
}
