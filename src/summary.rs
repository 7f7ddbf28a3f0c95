use log::info;

use crate::{error::PipelineError, exchange_rate::RateTable};

#[derive(Debug, Clone, PartialEq)]
pub struct Extremum {
    pub currency: String,
    pub exchange_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: Extremum,
    pub max: Extremum,
}

impl Summary {
    pub fn log(&self) {
        info!(
            "Minimum exchange rate is {} ({})",
            self.min.exchange_rate, self.min.currency
        );
        info!(
            "Maximum exchange rate is {} ({})",
            self.max.exchange_rate, self.max.currency
        );
    }
}

/// Lowest and highest rate of the table. Ties keep the first row seen.
pub fn summarize(table: &RateTable) -> Result<Summary, PipelineError> {
    let mut records = table.records().iter();
    let first = records
        .next()
        .ok_or(PipelineError::EmptyTable { stage: "summarize" })?;

    let (mut min, mut max) = (first, first);
    for record in records {
        if record.exchange_rate < min.exchange_rate {
            min = record;
        }
        if record.exchange_rate > max.exchange_rate {
            max = record;
        }
    }

    Ok(Summary {
        count: table.len(),
        min: Extremum {
            currency: min.currency.clone(),
            exchange_rate: min.exchange_rate,
        },
        max: Extremum {
            currency: max.currency.clone(),
            exchange_rate: max.exchange_rate,
        },
    })
}
