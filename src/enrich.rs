use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    exchange_rate::{RateRecord, RateTable},
    validate::ValidRate,
};

/// Source of the batch ingestion timestamp.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the running process, in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// `round(rate * 100, 1)`, rounding half to even.
///
/// The multiplication happens in decimal on the shortest string that
/// round-trips `rate`, so `0.0125` gives `1.2` rather than whatever the
/// binary product happens to land on. Rates too large or too small for
/// `Decimal` use the same rule in `f64`; where the tenths no longer fit an
/// `f64` the unrounded product is already integral and is returned as is.
pub fn percent_of(rate: f64) -> f64 {
    let scaled = Decimal::from_str(&rate.to_string())
        .ok()
        .and_then(|d| d.checked_mul(Decimal::ONE_HUNDRED))
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven));

    match scaled.and_then(|d| d.to_string().parse::<f64>().ok()) {
        Some(percent) => percent,
        None => {
            let percent = rate * 100.0;
            let tenths = percent * 10.0;
            if tenths.is_finite() {
                tenths.round_ties_even() / 10.0
            } else {
                percent
            }
        }
    }
}

/// Adds the percentage column and stamps every row with `ingested_at`,
/// truncated to whole seconds.
pub fn enrich(rows: Vec<ValidRate>, ingested_at: NaiveDateTime) -> RateTable {
    let ingested_at = ingested_at.with_nanosecond(0).unwrap_or(ingested_at);

    let records = rows
        .into_iter()
        .map(|row| RateRecord {
            exchange_rate_percent: percent_of(row.exchange_rate),
            currency: row.currency,
            exchange_rate: row.exchange_rate,
            ingestion_timestamp: ingested_at,
        })
        .collect();

    RateTable::from_records(records)
}
