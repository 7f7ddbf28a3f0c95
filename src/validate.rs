//! Row-level checks run before enrichment.
//!
//! Each check is a pure predicate with a matching remediation that drops the
//! offending rows. Duplicates are defined by `currency` alone: a snapshot holds
//! one rate per currency, and the first occurrence wins.

use std::collections::HashSet;

use log::{info, warn};

use crate::exchange_rate::RawRate;

/// A row that passed every check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRate {
    pub currency: String,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub has_nulls: bool,
    pub has_invalid_rates: bool,
    pub has_duplicates: bool,
    pub dropped_nulls: usize,
    pub dropped_invalid_rates: usize,
    pub dropped_duplicates: usize,
}

impl ValidationReport {
    pub fn dropped(&self) -> usize {
        self.dropped_nulls + self.dropped_invalid_rates + self.dropped_duplicates
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub rows: Vec<ValidRate>,
    pub report: ValidationReport,
}

fn is_null(row: &RawRate) -> bool {
    row.currency.trim().is_empty() || row.exchange_rate.is_none()
}

/// Rates must be positive and finite, and so must their percentage.
fn is_invalid_rate(row: &RawRate) -> bool {
    matches!(
        row.exchange_rate,
        Some(rate) if !(rate.is_finite() && rate > 0.0 && (rate * 100.0).is_finite())
    )
}

pub fn has_nulls(rows: &[RawRate]) -> bool {
    rows.iter().any(is_null)
}

pub fn has_invalid_rates(rows: &[RawRate]) -> bool {
    rows.iter().any(is_invalid_rate)
}

pub fn has_duplicates(rows: &[RawRate]) -> bool {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter().any(|row| !seen.insert(row.currency.as_str()))
}

pub fn drop_nulls(rows: &[RawRate]) -> Vec<RawRate> {
    rows.iter().filter(|row| !is_null(row)).cloned().collect()
}

pub fn drop_invalid_rates(rows: &[RawRate]) -> Vec<RawRate> {
    rows.iter().filter(|row| !is_invalid_rate(row)).cloned().collect()
}

pub fn drop_duplicates(rows: &[RawRate]) -> Vec<RawRate> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.currency.as_str()) {
            kept.push(row.clone());
        }
    }
    kept
}

/// Classifies `rows`, then applies whichever remediations were needed.
/// Nulls and invalid rates go first so a bad row never shadows a good duplicate.
pub fn validate(rows: &[RawRate]) -> Validated {
    let mut report = ValidationReport {
        has_nulls: has_nulls(rows),
        has_invalid_rates: has_invalid_rates(rows),
        has_duplicates: has_duplicates(rows),
        ..Default::default()
    };

    info!("Contains NULLs: {}", report.has_nulls);
    info!("Contains Duplicates: {}", report.has_duplicates);

    let mut clean = rows.to_vec();

    if report.has_nulls {
        let kept = drop_nulls(&clean);
        report.dropped_nulls = clean.len() - kept.len();
        clean = kept;
    }
    if report.has_invalid_rates {
        let kept = drop_invalid_rates(&clean);
        report.dropped_invalid_rates = clean.len() - kept.len();
        clean = kept;
    }
    if report.has_duplicates {
        let kept = drop_duplicates(&clean);
        report.dropped_duplicates = clean.len() - kept.len();
        clean = kept;
    }

    if report.dropped() > 0 {
        warn!(
            "Dropped {} rows ({} null, {} invalid rate, {} duplicate currency)",
            report.dropped(),
            report.dropped_nulls,
            report.dropped_invalid_rates,
            report.dropped_duplicates
        );
    }

    let rows = clean
        .into_iter()
        .filter_map(|row| {
            row.exchange_rate.map(|exchange_rate| ValidRate {
                currency: row.currency,
                exchange_rate,
            })
        })
        .collect();

    Validated { rows, report }
}
