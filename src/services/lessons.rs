//! Lesson analytics: status mix, monthly trend and a month-by-month log.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::{Lesson, LessonStatus};

use super::aggregator::{count_by_status, group_by_month, percentage_of, UNKNOWN};
use super::expansion::ExpansionState;
use super::series::{slices, Group, Slice};
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct LessonsView {
    pub status_distribution: Vec<Slice>,
    pub monthly_trend: Vec<LessonTrend>,
    pub monthly_details: Vec<Group<StatusCounts, LessonRow>>,
    pub attendance_rate: f64,
    pub total_lessons: usize,
    pub undated_lessons: usize,
}

/// Per-status tally. Lessons with an unrecognised status only count towards `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub attended: usize,
    pub cancelled: usize,
    pub pending: usize,
}

impl StatusCounts {
    pub fn tally<'a, I>(lessons: I) -> Self
    where
        I: IntoIterator<Item = &'a Lesson>,
    {
        lessons.into_iter().fold(Self::default(), |mut acc, lesson| {
            acc.total += 1;
            match lesson.status {
                Some(LessonStatus::Attended) => acc.attended += 1,
                Some(LessonStatus::Cancelled) => acc.cancelled += 1,
                Some(LessonStatus::Pending) => acc.pending += 1,
                None => {}
            }
            acc
        })
    }

    /// Attended share of all lessons, 0 when there are none.
    pub fn attendance_rate(&self) -> f64 {
        percentage_of(self.attended as f64, self.total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonTrend {
    pub month: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonRow {
    pub start_datetime: Option<NaiveDateTime>,
    pub teacher: String,
    pub package: String,
    pub status: Option<LessonStatus>,
    pub remarks: Option<String>,
}

pub fn build(snapshot: &Snapshot, expanded_months: &ExpansionState) -> LessonsView {
    let lookups = snapshot.lookups();
    let by_month = group_by_month(&snapshot.lessons, |l| l.start_datetime);

    let status_distribution = slices(
        &count_by_status(&snapshot.lessons, |l| l.status),
        |status| status.as_str().to_string(),
    );

    let monthly_trend = by_month
        .iter()
        .map(|(month, lessons)| LessonTrend {
            month: month.to_string(),
            counts: StatusCounts::tally(lessons.iter().copied()),
        })
        .collect();

    let monthly_details = by_month
        .latest_first()
        .map(|(month, lessons)| {
            let expanded = expanded_months.is_expanded(month);
            let rows = if expanded {
                let mut sorted = lessons.to_vec();
                sorted.sort_by_key(|l| l.start_datetime);
                sorted
                    .into_iter()
                    .map(|lesson| LessonRow {
                        start_datetime: lesson.start_datetime,
                        teacher: lookups.user_name_or(lesson.teacher.as_deref(), UNKNOWN),
                        package: lookups
                            .package(lesson.package)
                            .and_then(|p| p.name.clone())
                            .unwrap_or_else(|| "-".to_string()),
                        status: lesson.status,
                        remarks: lesson.remarks.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            Group {
                key: month.to_string(),
                label: month.to_string(),
                expanded,
                summary: StatusCounts::tally(lessons.iter().copied()),
                rows,
            }
        })
        .collect();

    let overall = StatusCounts::tally(&snapshot.lessons);

    LessonsView {
        status_distribution,
        monthly_trend,
        monthly_details,
        attendance_rate: overall.attendance_rate(),
        total_lessons: overall.total,
        undated_lessons: by_month.undated().len(),
    }
}

/// Fetch lessons, users and packages, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    expanded_months: &ExpansionState,
) -> Result<LessonsView, AppError> {
    let (lessons, users, packages) = tokio::try_join!(
        client.lessons(credential),
        client.users(credential),
        client.packages(credential),
    )?;

    let snapshot = Snapshot {
        lessons,
        users,
        packages,
        ..Snapshot::default()
    };
    Ok(build(&snapshot, expanded_months))
}
