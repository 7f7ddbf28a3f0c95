//! Snapshot of the latest exchange rates for one base currency, cleaned,
//! enriched and written as CSV for a downstream bulk loader.

pub mod config;
pub mod enrich;
pub mod error;
pub mod exchange_rate;
pub mod export;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod summary;
pub mod validate;

pub use config::Config;
pub use enrich::{Clock, FixedClock, SystemClock};
pub use error::PipelineError;
pub use exchange_rate::{CurrencyCode, RateRecord, RateTable};
pub use fetch::{HttpRateSource, RateSource};
pub use pipeline::{PipelineReport, run_pipeline};
