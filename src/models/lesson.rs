//! Scheduled lessons and their attendance outcome.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Attended,
    Cancelled,
    Pending,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for LessonStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attended" => Ok(Self::Attended),
            "cancelled" => Ok(Self::Cancelled),
            "pending" => Ok(Self::Pending),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub package: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string_key")]
    pub teacher: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_datetime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::parsed")]
    pub status: Option<LessonStatus>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub remarks: Option<String>,
}

impl Lesson {
    pub fn is_attended(&self) -> bool {
        self.status == Some(LessonStatus::Attended)
    }
}
