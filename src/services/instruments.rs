//! Instrument popularity across students and teachers.

use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::InstrumentLink;

use super::aggregator::{percentage_of, ratio, Ratio, UNKNOWN};
use super::series::Slice;
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentsView {
    pub instruments: Vec<InstrumentRow>,
    pub student_distribution: Vec<Slice>,
    pub total_students: usize,
    pub total_teachers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentRow {
    pub name: String,
    pub students: usize,
    pub teachers: usize,
    pub student_share: f64,
    pub teacher_share: f64,
    pub student_teacher_ratio: Ratio,
}

fn links_to(links: &[InstrumentLink], id: Option<i64>) -> usize {
    match id {
        Some(id) => links.iter().filter(|l| l.instruments_id == Some(id)).count(),
        None => 0,
    }
}

/// Totals only include links to listed instruments.
pub fn build(snapshot: &Snapshot) -> InstrumentsView {
    let counts: Vec<(String, usize, usize)> = snapshot
        .instruments
        .iter()
        .map(|i| {
            (
                i.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                links_to(&snapshot.student_instruments, i.id),
                links_to(&snapshot.teacher_instruments, i.id),
            )
        })
        .collect();

    let total_students: usize = counts.iter().map(|(_, s, _)| s).sum();
    let total_teachers: usize = counts.iter().map(|(_, _, t)| t).sum();

    let student_distribution = counts
        .iter()
        .map(|(name, students, _)| Slice {
            name: name.clone(),
            value: *students as f64,
        })
        .collect();

    let instruments = counts
        .into_iter()
        .map(|(name, students, teachers)| InstrumentRow {
            name,
            students,
            teachers,
            student_share: percentage_of(students as f64, total_students as f64),
            teacher_share: percentage_of(teachers as f64, total_teachers as f64),
            student_teacher_ratio: ratio(students as f64, teachers as f64),
        })
        .collect();

    InstrumentsView {
        instruments,
        student_distribution,
        total_students,
        total_teachers,
    }
}

pub async fn load(client: &ContentClient, credential: &Credential) -> Result<InstrumentsView, AppError> {
    let (instruments, student_instruments, teacher_instruments) = tokio::try_join!(
        client.instruments(credential),
        client.student_instruments(credential),
        client.teacher_instruments(credential),
    )?;

    let snapshot = Snapshot {
        instruments,
        student_instruments,
        teacher_instruments,
        ..Snapshot::default()
    };
    Ok(build(&snapshot))
}
