//! Payments made against packages.

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::lenient;

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub payment_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::int_key")]
    pub package: Option<i64>,
}
