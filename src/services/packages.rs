//! Package management: status mix, instrument demand and a three-level
//! drill-down (package name, student, package).
//!
//! Name groups are keyed by the package name. Student groups are keyed by
//! `"{package name}/{student id}"` so the same student under two package
//! names expands independently.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::{Lesson, LessonStatus, Package, PackageStatus};

use super::aggregator::{average_of, count_by, count_by_status, percentage_of};
use super::expansion::ExpansionState;
use super::series::{bars, slices, Bar, Group, Slice};
use super::snapshot::{Lookups, Snapshot};
use super::students::attended_by_package;

const RECENT_LESSONS: usize = 5;
const UNNAMED: &str = "-";
const NO_STUDENT_KEY: &str = "unknown";

/// Per-level expansion state for the package drill-down.
#[derive(Debug, Clone, Default)]
pub struct PackageExpansion {
    pub names: ExpansionState,
    pub students: ExpansionState,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackagesView {
    pub status_distribution: Vec<Slice>,
    pub packages_by_instrument: Vec<Bar>,
    pub packages: Vec<Group<NameSummary, StudentGroup>>,
    pub active_packages: usize,
    pub completed_share: f64,
    /// Mean package duration in minutes, rounded.
    pub average_duration: i64,
}

pub type StudentGroup = Group<StudentSummary, PackageDetail>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameSummary {
    pub students: usize,
    pub active_packages: usize,
    pub total_lessons: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub package_count: usize,
    pub active_packages: usize,
    pub completed_lessons: usize,
    pub lessons_quota: i64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageDetail {
    pub id: Option<i64>,
    pub start_datetime: Option<NaiveDateTime>,
    pub end_datetime: Option<NaiveDateTime>,
    pub duration: Option<i64>,
    pub status: Option<PackageStatus>,
    pub remarks: Option<String>,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub lessons_quota: i64,
    pub recent_lessons: Vec<RecentLesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentLesson {
    pub start_datetime: Option<NaiveDateTime>,
    pub status: Option<LessonStatus>,
}

struct LessonIndex<'a> {
    by_package: BTreeMap<i64, Vec<&'a Lesson>>,
    attended: BTreeMap<i64, usize>,
}

impl<'a> LessonIndex<'a> {
    fn new(lessons: &'a [Lesson]) -> Self {
        let mut by_package: BTreeMap<i64, Vec<&'a Lesson>> = BTreeMap::new();
        for lesson in lessons {
            if let Some(id) = lesson.package {
                by_package.entry(id).or_default().push(lesson);
            }
        }
        Self {
            by_package,
            attended: attended_by_package(lessons),
        }
    }

    fn lessons(&self, pkg: &Package) -> &[&'a Lesson] {
        pkg.id
            .and_then(|id| self.by_package.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn attended(&self, pkg: &Package) -> usize {
        pkg.id
            .and_then(|id| self.attended.get(&id).copied())
            .unwrap_or(0)
    }
}

pub fn build(snapshot: &Snapshot, expansion: &PackageExpansion) -> PackagesView {
    let lookups = snapshot.lookups();
    let index = LessonIndex::new(&snapshot.lessons);

    let status_distribution = slices(
        &count_by_status(&snapshot.packages, |p| p.status),
        |status| status.as_str().to_string(),
    );
    let packages_by_instrument = bars(
        &count_by(&snapshot.packages, |p| Some(lookups.instrument_name(p.instrument))),
        |name| name.clone(),
    );

    let mut by_name: BTreeMap<String, BTreeMap<String, Vec<&Package>>> = BTreeMap::new();
    for pkg in &snapshot.packages {
        let name = pkg.name.clone().unwrap_or_else(|| UNNAMED.to_string());
        let student = pkg
            .student
            .clone()
            .unwrap_or_else(|| NO_STUDENT_KEY.to_string());
        by_name
            .entry(name)
            .or_default()
            .entry(student)
            .or_default()
            .push(pkg);
    }

    let packages = by_name
        .iter()
        .map(|(name, students)| {
            let all = students.values().flatten();
            let summary = NameSummary {
                students: students.len(),
                active_packages: all.clone().filter(|p| p.is_active()).count(),
                total_lessons: all.map(|p| index.lessons(p).len()).sum(),
            };
            let expanded = expansion.names.is_expanded(name);
            let rows = if expanded {
                student_groups(name, students, &index, &lookups, &expansion.students)
            } else {
                Vec::new()
            };
            Group {
                key: name.clone(),
                label: name.clone(),
                expanded,
                summary,
                rows,
            }
        })
        .collect();

    let completed = snapshot
        .packages
        .iter()
        .filter(|p| p.status == Some(PackageStatus::Completed))
        .count();
    let total_duration: i64 = snapshot.packages.iter().filter_map(|p| p.duration).sum();

    PackagesView {
        status_distribution,
        packages_by_instrument,
        packages,
        active_packages: snapshot.packages.iter().filter(|p| p.is_active()).count(),
        completed_share: percentage_of(completed as f64, snapshot.packages.len() as f64),
        average_duration: average_of(total_duration as f64, snapshot.packages.len()).round() as i64,
    }
}

fn student_groups(
    name: &str,
    students: &BTreeMap<String, Vec<&Package>>,
    index: &LessonIndex<'_>,
    lookups: &Lookups<'_>,
    expanded_students: &ExpansionState,
) -> Vec<StudentGroup> {
    let mut groups: Vec<StudentGroup> = students
        .iter()
        .map(|(student_id, packages)| {
            let completed_lessons: usize = packages.iter().map(|p| index.attended(p)).sum();
            let lessons_quota: i64 = packages.iter().filter_map(|p| p.lessons_quota).sum();
            let key = format!("{name}/{student_id}");
            let expanded = expanded_students.is_expanded(&key);
            let rows = if expanded {
                packages.iter().map(|p| detail(p, index)).collect()
            } else {
                Vec::new()
            };
            Group {
                label: lookups.user_name_or(Some(student_id.as_str()), "Unknown Student"),
                key,
                expanded,
                summary: StudentSummary {
                    package_count: packages.len(),
                    active_packages: packages.iter().filter(|p| p.is_active()).count(),
                    completed_lessons,
                    lessons_quota,
                    progress: percentage_of(completed_lessons as f64, lessons_quota as f64),
                },
                rows,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.key.cmp(&b.key)));
    groups
}

fn detail(pkg: &Package, index: &LessonIndex<'_>) -> PackageDetail {
    let lessons = index.lessons(pkg);
    let mut recent = lessons.to_vec();
    recent.sort_by(|a, b| b.start_datetime.cmp(&a.start_datetime));
    recent.truncate(RECENT_LESSONS);

    PackageDetail {
        id: pkg.id,
        start_datetime: pkg.start_datetime,
        end_datetime: pkg.end_datetime,
        duration: pkg.duration,
        status: pkg.status,
        remarks: pkg.remarks.clone(),
        total_lessons: lessons.len(),
        completed_lessons: index.attended(pkg),
        lessons_quota: pkg.lessons_quota.unwrap_or(0),
        recent_lessons: recent
            .into_iter()
            .map(|l| RecentLesson {
                start_datetime: l.start_datetime,
                status: l.status,
            })
            .collect(),
    }
}

/// Fetch users, packages, lessons and instruments, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    expansion: &PackageExpansion,
) -> Result<PackagesView, AppError> {
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
    Ok(build(&snapshot, expansion))
}
