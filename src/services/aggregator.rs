//! Pure aggregation primitives shared by every dashboard view.
//!
//! Each function takes its collection plus a field selector closure and is
//! independent of input order. Zero-input behaviour is fixed: sums are 0,
//! percentages of a zero whole are 0, ratios against zero are `N/A`.

use std::collections::BTreeMap;
use std::hash::Hash;

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};

use super::normalizer::{Keyed, Lookup};

/// Label used wherever a join does not resolve.
pub const UNKNOWN: &str = "Unknown";

/// Zero-padded, year-first `YYYY-MM` key; sorts chronologically as a string.
pub fn month_key(at: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// Records bucketed by calendar month.
#[derive(Debug)]
pub struct MonthBuckets<'a, T> {
    buckets: BTreeMap<String, Vec<&'a T>>,
    undated: Vec<&'a T>,
}

impl<'a, T> MonthBuckets<'a, T> {
    /// Buckets in ascending month order (trend series).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &[&'a T])> + '_ {
        self.buckets
            .iter()
            .map(|(month, records)| (month.as_str(), records.as_slice()))
    }

    /// Buckets in descending month order (latest-first tables).
    pub fn latest_first(&self) -> impl Iterator<Item = (&str, &[&'a T])> + '_ {
        self.iter().rev()
    }

    pub fn get(&self, month: &str) -> Option<&[&'a T]> {
        self.buckets.get(month).map(Vec::as_slice)
    }

    /// Records whose date was missing or unparseable.
    pub fn undated(&self) -> &[&'a T] {
        &self.undated
    }

    /// Every record, dated buckets first, then undated ones.
    pub fn flatten(&self) -> Vec<&'a T> {
        self.buckets
            .values()
            .flatten()
            .chain(self.undated.iter())
            .copied()
            .collect()
    }
}

pub fn group_by_month<'a, T, I, F>(records: I, date: F) -> MonthBuckets<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<NaiveDateTime>,
{
    let mut buckets: BTreeMap<String, Vec<&'a T>> = BTreeMap::new();
    let mut undated = Vec::new();
    for record in records {
        match date(record) {
            Some(at) => buckets.entry(month_key(&at)).or_default().push(record),
            None => undated.push(record),
        }
    }
    MonthBuckets { buckets, undated }
}

/// Sum of `value` over `records`; absent values count as 0.
pub fn sum_by<'a, T, I, F>(records: I, value: F) -> f64
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<f64>,
{
    records
        .into_iter()
        .filter_map(|r| value(r))
        .filter(|v| v.is_finite())
        .sum()
}

/// Occurrences per key; records whose key is absent are dropped.
pub fn count_by<'a, T, K, I, F>(records: I, key: F) -> BTreeMap<K, usize>
where
    T: 'a,
    K: Ord,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<K>,
{
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    counts
}

/// Occurrences per status. Missing or unrecognised statuses get no bucket.
pub fn count_by_status<'a, T, S, I, F>(records: I, status: F) -> BTreeMap<S, usize>
where
    T: 'a,
    S: Ord,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<S>,
{
    count_by(records, status)
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let pct = part / whole * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Mean of `total` over `count` items, or 0 for no items.
pub fn average_of(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Completed share of a package quota; quotas below 1 are treated as 1.
pub fn completion_rate(completed: usize, lessons_quota: Option<i64>) -> f64 {
    let quota = lessons_quota.unwrap_or(0).max(1);
    completed as f64 / quota as f64 * 100.0
}

/// Quotient that is explicitly unavailable when the divisor is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Value(f64),
    NotApplicable,
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

pub fn ratio(a: f64, b: f64) -> Ratio {
    if b == 0.0 {
        return Ratio::NotApplicable;
    }
    let value = a / b;
    if value.is_finite() {
        Ratio::Value(value)
    } else {
        Ratio::NotApplicable
    }
}

/// A record paired with whatever its foreign key resolved to.
#[derive(Debug)]
pub struct Joined<'a, 'b, T, V> {
    pub record: &'a T,
    pub resolved: Option<&'b V>,
}

impl<T, V> Joined<'_, '_, T, V> {
    /// `label` of the resolved record, or [`UNKNOWN`].
    pub fn label_or_unknown<F>(&self, label: F) -> String
    where
        F: Fn(&V) -> Option<String>,
    {
        self.resolved
            .and_then(label)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

pub fn join_lookup<'a, 'b, T, V, I, F>(
    records: I,
    foreign_key: F,
    lookup: &Lookup<'b, V>,
) -> Vec<Joined<'a, 'b, T, V>>
where
    T: 'a,
    V: Keyed,
    V::Key: Hash + Eq,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Option<V::Key>,
{
    records
        .into_iter()
        .map(|record| Joined {
            record,
            resolved: foreign_key(record).and_then(|k| lookup.get(&k)),
        })
        .collect()
}
