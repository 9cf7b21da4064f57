//! Student analytics: package load, attendance and per-student progress.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::{Lesson, Package};

use super::aggregator::{average_of, completion_rate, count_by, count_by_status, UNKNOWN};
use super::expansion::ExpansionState;
use super::lessons::StatusCounts;
use super::series::{bars, slices, Bar, Group, Slice};
use super::snapshot::{Lookups, Snapshot};

/// Group key for packages whose student id is missing.
const NO_STUDENT_KEY: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
pub struct StudentsView {
    pub packages_per_student: Vec<Bar>,
    pub attendance_distribution: Vec<Slice>,
    pub progress: Vec<Group<StudentSummary, PackageProgress>>,
    pub attendance_rate: f64,
    pub active_students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub package_count: usize,
    /// Packages below 100% completion.
    pub active_package_count: usize,
    pub overall_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageProgress {
    pub package_name: String,
    pub instrument: String,
    pub completion_rate: f64,
    pub remaining_lessons: i64,
}

/// Attended lessons per package id.
pub(crate) fn attended_by_package(lessons: &[Lesson]) -> BTreeMap<i64, usize> {
    count_by(lessons.iter().filter(|l| l.is_attended()), |l| l.package)
}

fn progress_of(pkg: &Package, attended: &BTreeMap<i64, usize>, lookups: &Lookups<'_>) -> PackageProgress {
    let completed = pkg
        .id
        .and_then(|id| attended.get(&id).copied())
        .unwrap_or(0);
    PackageProgress {
        package_name: pkg.name.clone().unwrap_or_else(|| "-".to_string()),
        instrument: lookups.instrument_name(pkg.instrument),
        completion_rate: completion_rate(completed, pkg.lessons_quota),
        remaining_lessons: pkg.lessons_quota.unwrap_or(0) - completed as i64,
    }
}

pub fn build(snapshot: &Snapshot, expanded_students: &ExpansionState) -> StudentsView {
    let lookups = snapshot.lookups();
    let attended = attended_by_package(&snapshot.lessons);

    let packages_per_student = bars(
        &count_by(&snapshot.packages, |p| {
            lookups.user(p.student.as_deref()).map(|u| u.full_name())
        }),
        |name| name.clone(),
    );

    let attendance_distribution = slices(
        &count_by_status(&snapshot.lessons, |l| l.status),
        |status| status.as_str().to_string(),
    );

    let mut by_student: BTreeMap<String, Vec<PackageProgress>> = BTreeMap::new();
    for pkg in &snapshot.packages {
        let key = pkg
            .student
            .clone()
            .unwrap_or_else(|| NO_STUDENT_KEY.to_string());
        by_student
            .entry(key)
            .or_default()
            .push(progress_of(pkg, &attended, &lookups));
    }

    let mut progress: Vec<Group<StudentSummary, PackageProgress>> = by_student
        .into_iter()
        .map(|(key, mut packages)| {
            let total: f64 = packages.iter().map(|p| p.completion_rate).sum();
            let summary = StudentSummary {
                package_count: packages.len(),
                active_package_count: packages.iter().filter(|p| p.completion_rate < 100.0).count(),
                overall_progress: average_of(total, packages.len()),
            };
            let expanded = expanded_students.is_expanded(&key);
            if expanded {
                packages.sort_by(|a, b| b.completion_rate.total_cmp(&a.completion_rate));
            } else {
                packages.clear();
            }
            Group {
                label: lookups.user_name_or(Some(key.as_str()), UNKNOWN),
                key,
                expanded,
                summary,
                rows: packages,
            }
        })
        .collect();
    progress.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.key.cmp(&b.key)));

    let active_students: BTreeSet<&str> = snapshot
        .packages
        .iter()
        .filter(|p| p.is_active())
        .filter_map(|p| p.student.as_deref())
        .collect();

    StudentsView {
        packages_per_student,
        attendance_distribution,
        progress,
        attendance_rate: StatusCounts::tally(&snapshot.lessons).attendance_rate(),
        active_students: active_students.len(),
    }
}

/// Fetch users, packages, lessons and instruments, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    expanded_students: &ExpansionState,
) -> Result<StudentsView, AppError> {
    let (users, packages, lessons, instruments) = tokio::try_join!(
        client.users(credential),
        client.packages(credential),
        client.lessons(credential),
        client.instruments(credential),
    )?;

    let snapshot = Snapshot {
        users,
        packages,
        lessons,
        instruments,
        ..Snapshot::default()
    };
    Ok(build(&snapshot, expanded_students))
}
