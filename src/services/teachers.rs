//! Teacher workload and performance.
//!
//! Student counts come from the teacher/student relation table, lesson
//! counts from lesson history. The two sources are not reconciled: a teacher
//! can have related students with no lessons, or lessons with students that
//! have no relation row.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::{RoleKind, RoleMatcher, User};

use super::aggregator::UNKNOWN;
use super::expansion::ExpansionState;
use super::lessons::StatusCounts;
use super::series::{Group, Slice};
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct TeachersView {
    pub teachers: Vec<Group<TeacherStats, StudentPair>>,
    pub workload: Vec<Workload>,
    pub lesson_status: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherStats {
    pub total_students: usize,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub cancelled_lessons: usize,
    pub pending_lessons: usize,
    pub completion_rate: f64,
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentPair {
    pub student: String,
    pub instrument: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub name: String,
    pub students: usize,
    pub lessons: usize,
}

pub fn build(snapshot: &Snapshot, roles: &RoleMatcher, expanded_teachers: &ExpansionState) -> TeachersView {
    let lookups = snapshot.lookups();

    let mut teachers: Vec<&User> = snapshot
        .users
        .iter()
        .filter(|u| u.id.is_some() && roles.is(u, RoleKind::Teacher))
        .collect();
    teachers.sort_by_key(|u| u.full_name());

    let mut groups = Vec::with_capacity(teachers.len());
    let mut overall = StatusCounts::default();

    for teacher in teachers {
        let Some(teacher_id) = teacher.id.as_deref() else {
            continue;
        };
        let counts = StatusCounts::tally(
            snapshot
                .lessons
                .iter()
                .filter(|l| l.teacher.as_deref() == Some(teacher_id)),
        );
        overall.total += counts.total;
        overall.attended += counts.attended;
        overall.cancelled += counts.cancelled;
        overall.pending += counts.pending;

        let relations: Vec<_> = snapshot
            .relations
            .iter()
            .filter(|r| r.teacher.as_deref() == Some(teacher_id))
            .collect();
        let students: BTreeSet<&str> = relations.iter().filter_map(|r| r.student.as_deref()).collect();
        let instruments: BTreeSet<String> = relations
            .iter()
            .map(|r| lookups.instrument_name(r.instrument))
            .collect();

        let expanded = expanded_teachers.is_expanded(teacher_id);
        let rows = if expanded {
            let pairs: BTreeSet<(String, String)> = relations
                .iter()
                .map(|r| {
                    (
                        lookups.user_name_or(r.student.as_deref(), "Unknown Student"),
                        lookups.instrument_name(r.instrument),
                    )
                })
                .collect();
            pairs
                .into_iter()
                .map(|(student, instrument)| StudentPair { student, instrument })
                .collect()
        } else {
            Vec::new()
        };

        groups.push(Group {
            key: teacher_id.to_string(),
            label: teacher.full_name(),
            expanded,
            summary: TeacherStats {
                total_students: students.len(),
                total_lessons: counts.total,
                completed_lessons: counts.attended,
                cancelled_lessons: counts.cancelled,
                pending_lessons: counts.pending,
                completion_rate: counts.attendance_rate(),
                instruments: instruments.into_iter().collect(),
            },
            rows,
        });
    }

    let workload = groups
        .iter()
        .map(|g| Workload {
            name: g.label.clone(),
            students: g.summary.total_students,
            lessons: g.summary.total_lessons,
        })
        .collect();

    let lesson_status = vec![
        Slice { name: "Completed".to_string(), value: overall.attended as f64 },
        Slice { name: "Cancelled".to_string(), value: overall.cancelled as f64 },
        Slice { name: "Pending".to_string(), value: overall.pending as f64 },
    ];

    TeachersView {
        teachers: groups,
        workload,
        lesson_status,
    }
}

/// Fetch users, lessons, relations and instruments, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    roles: &RoleMatcher,
    expanded_teachers: &ExpansionState,
) -> Result<TeachersView, AppError> {
    let (users, lessons, relations, instruments) = tokio::try_join!(
        client.users(credential),
        client.lessons(credential),
        client.relations(credential),
        client.instruments(credential),
    )?;

    tracing::debug!(teachers = users.iter().filter(|u| roles.is(u, RoleKind::Teacher)).count(), "Building teacher view");

    let snapshot = Snapshot {
        users,
        lessons,
        relations,
        instruments,
        ..Snapshot::default()
    };
    Ok(build(&snapshot, roles, expanded_teachers))
}
