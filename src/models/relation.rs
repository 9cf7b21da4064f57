//! Teacher/student/instrument junction (`student_teacher_relations`).

use serde::Deserialize;

use super::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    #[serde(default, deserialize_with = "lenient::string_key")]
    pub teacher: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_key")]
    pub student: Option<String>,
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub instrument: Option<i64>,
}
