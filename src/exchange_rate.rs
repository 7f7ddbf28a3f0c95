use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, de};

use crate::error::PipelineError;

/// Layout of `ingestion_timestamp` everywhere it leaves the process.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Three-letter, upper-case currency code used as the base of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PipelineError::Configuration(format!(
                "currency code must be three ASCII letters, got {s:?}"
            )));
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the provider's conversion table before validation.
/// `exchange_rate` is `None` when the provider sent null or a non-number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRate {
    pub currency: String,
    pub exchange_rate: Option<f64>,
}

impl RawRate {
    pub fn new(currency: impl Into<String>, exchange_rate: Option<f64>) -> Self {
        Self {
            currency: currency.into(),
            exchange_rate,
        }
    }
}

/// A fully enriched row. Field names double as the export file's header.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateRecord {
    pub currency: String,
    pub exchange_rate: f64,
    #[serde(rename = "exchange_rate_%")]
    pub exchange_rate_percent: f64,
    #[serde(deserialize_with = "parse_timestamp")]
    pub ingestion_timestamp: NaiveDateTime,
}

/// Clean, enriched rates of one run. Built only by [`crate::enrich::enrich`],
/// so currencies are unique and all rows share one ingestion timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    records: Vec<RateRecord>,
}

impl RateTable {
    pub(crate) fn from_records(records: Vec<RateRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, currency: &str) -> Option<&RateRecord> {
        self.records.iter().find(|r| r.currency == currency)
    }
}

fn parse_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
}
