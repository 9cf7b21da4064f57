//! User records and teacher/student role classification.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;
use crate::config::AppConfig;

/// Role as the content API returns it: a bare id, or expanded with its name.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleRef {
    Id(String),
    Expanded {
        id: Option<String>,
        name: Option<String>,
    },
}

impl RoleRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Expanded { id, .. } => id.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Expanded { name, .. } => name.as_deref(),
        }
    }
}

fn role_ref<'de, D>(deserializer: D) -> Result<Option<RoleRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::String(id) => Some(RoleRef::Id(id.clone())),
        Value::Object(map) => Some(RoleRef::Expanded {
            id: map.get("id").and_then(lenient::string_from_value),
            name: map.get("name").and_then(|v| v.as_str()).map(str::to_string),
        }),
        _ => None,
    })
}

/// A content API user (teacher, student, or staff).
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient::string_key")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "role_ref")]
    pub role: Option<RoleRef>,
}

impl User {
    /// "First Last", trimmed; empty when neither name is set.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Teacher,
    Student,
}

/// Classifies users by the configured role ids or by nested role name.
#[derive(Debug, Clone)]
pub struct RoleMatcher {
    pub teacher_role_id: String,
    pub student_role_id: String,
}

impl RoleMatcher {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            teacher_role_id: config.teacher_role_id.clone(),
            student_role_id: config.student_role_id.clone(),
        }
    }

    pub fn classify(&self, user: &User) -> Option<RoleKind> {
        let role = user.role.as_ref()?;
        match role.id() {
            Some(id) if id == self.teacher_role_id => return Some(RoleKind::Teacher),
            Some(id) if id == self.student_role_id => return Some(RoleKind::Student),
            _ => {}
        }
        match role.name().map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("teacher") => Some(RoleKind::Teacher),
            Some(name) if name.eq_ignore_ascii_case("student") => Some(RoleKind::Student),
            _ => None,
        }
    }

    pub fn is(&self, user: &User, kind: RoleKind) -> bool {
        self.classify(user) == Some(kind)
    }
}
