//! Output shapes handed to the presentation layer.
//!
//! Values are raw numbers; currency and date formatting happen client-side.

use std::collections::BTreeMap;

use serde::Serialize;

/// Pie-chart slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: f64,
}

/// Bar-chart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub name: String,
    pub count: usize,
}

/// One collapsible row of a drill-down table.
///
/// `summary` is always filled in; `rows` only when the group is expanded.
#[derive(Debug, Clone, Serialize)]
pub struct Group<S, R> {
    pub key: String,
    pub label: String,
    pub expanded: bool,
    #[serde(flatten)]
    pub summary: S,
    pub rows: Vec<R>,
}

pub fn slices<K, F>(counts: &BTreeMap<K, usize>, label: F) -> Vec<Slice>
where
    F: Fn(&K) -> String,
{
    counts
        .iter()
        .map(|(k, count)| Slice {
            name: label(k),
            value: *count as f64,
        })
        .collect()
}

pub fn bars<K, F>(counts: &BTreeMap<K, usize>, label: F) -> Vec<Bar>
where
    F: Fn(&K) -> String,
{
    counts
        .iter()
        .map(|(k, count)| Bar {
            name: label(k),
            count: *count,
        })
        .collect()
}
