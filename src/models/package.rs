//! Lesson packages purchased by students.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Draft,
    Active,
    Completed,
    Expired,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for PackageStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "expired" => Ok(Self::Expired),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_key")]
    pub student: Option<String>,
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub instrument: Option<i64>,
    /// Lesson length in minutes.
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub lessons_quota: Option<i64>,
    #[serde(default, deserialize_with = "lenient::parsed")]
    pub status: Option<PackageStatus>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_datetime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub end_datetime: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub remarks: Option<String>,
}

impl Package {
    pub fn is_active(&self) -> bool {
        self.status == Some(PackageStatus::Active)
    }
}
