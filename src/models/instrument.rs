//! Instruments and the instrument junction rows.

use serde::Deserialize;

use super::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct Instrument {
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

/// Row of `junction_students_instruments` or `junction_teachers_instruments`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentLink {
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub instruments_id: Option<i64>,
}
