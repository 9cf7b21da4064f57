//! Financial overview: revenue trend, revenue by instrument, monthly payments.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::AppError;
use crate::gateway::{ContentClient, Credential};
use crate::models::Payment;

use super::aggregator::{average_of, group_by_month, join_lookup, sum_by};
use super::expansion::ExpansionState;
use super::series::{Group, Slice};
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct FinancialView {
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub revenue_by_instrument: Vec<Slice>,
    /// Revenue from payments whose package could not be resolved.
    pub unattributed_revenue: f64,
    pub monthly_details: Vec<Group<MonthSummary, PaymentRow>>,
    /// Payments left out of the monthly series because they carry no usable date.
    pub undated_payments: usize,
    pub total_revenue: f64,
    pub average_transaction_value: f64,
    pub active_packages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub total: f64,
    pub transaction_count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment_date: Option<NaiveDateTime>,
    pub payment_id: Option<String>,
    pub currency: Option<String>,
    pub package: String,
    pub student: String,
    pub amount: f64,
}

pub fn build(snapshot: &Snapshot, expanded_months: &ExpansionState) -> FinancialView {
    let lookups = snapshot.lookups();
    let by_month = group_by_month(&snapshot.payments, |p| p.payment_date);

    let monthly_revenue = by_month
        .iter()
        .map(|(month, payments)| MonthlyRevenue {
            month: month.to_string(),
            revenue: sum_by(payments.iter().copied(), |p| p.rate),
            transaction_count: payments.len(),
        })
        .collect();

    let mut by_instrument: BTreeMap<String, f64> = BTreeMap::new();
    let mut unattributed_revenue = 0.0;
    for joined in join_lookup(&snapshot.payments, |p| p.package, &lookups.packages) {
        let amount = joined.record.rate.unwrap_or(0.0);
        match joined.resolved {
            Some(pkg) => {
                *by_instrument
                    .entry(lookups.instrument_name(pkg.instrument))
                    .or_insert(0.0) += amount;
            }
            None => unattributed_revenue += amount,
        }
    }
    let revenue_by_instrument = by_instrument
        .into_iter()
        .map(|(name, value)| Slice { name, value })
        .collect();

    let monthly_details = by_month
        .latest_first()
        .map(|(month, payments)| {
            let total = sum_by(payments.iter().copied(), |p| p.rate);
            let expanded = expanded_months.is_expanded(month);
            let rows = if expanded {
                payment_rows(payments, snapshot)
            } else {
                Vec::new()
            };
            Group {
                key: month.to_string(),
                label: month.to_string(),
                expanded,
                summary: MonthSummary {
                    total,
                    transaction_count: payments.len(),
                    average: average_of(total, payments.len()),
                },
                rows,
            }
        })
        .collect();

    let total_revenue = sum_by(&snapshot.payments, |p| p.rate);

    FinancialView {
        monthly_revenue,
        revenue_by_instrument,
        unattributed_revenue,
        monthly_details,
        undated_payments: by_month.undated().len(),
        total_revenue,
        average_transaction_value: average_of(total_revenue, snapshot.payments.len()),
        active_packages: snapshot.packages.iter().filter(|p| p.is_active()).count(),
    }
}

/// Detail rows for one month, newest payment first.
fn payment_rows(payments: &[&Payment], snapshot: &Snapshot) -> Vec<PaymentRow> {
    let lookups = snapshot.lookups();
    let mut sorted = payments.to_vec();
    sorted.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
    sorted
        .into_iter()
        .map(|payment| {
            let pkg = lookups.package(payment.package);
            PaymentRow {
                payment_date: payment.payment_date,
                payment_id: payment.payment_id.clone(),
                currency: payment.currency.clone(),
                package: pkg
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| "-".to_string()),
                student: lookups.user_name_or(
                    pkg.and_then(|p| p.student.as_deref()),
                    "Unknown Student",
                ),
                amount: payment.rate.unwrap_or(0.0),
            }
        })
        .collect()
}

/// Fetch users, payments, packages and instruments, then build.
pub async fn load(
    client: &ContentClient,
    credential: &Credential,
    expanded_months: &ExpansionState,
) -> Result<FinancialView, AppError> {
    let (users, payments, packages, instruments) = tokio::try_join!(
        client.users(credential),
        client.payments(credential),
        client.packages(credential),
        client.instruments(credential),
    )?;

    let snapshot = Snapshot {
        users,
        payments,
        packages,
        instruments,
        ..Snapshot::default()
    };
    Ok(build(&snapshot, expanded_months))
}
