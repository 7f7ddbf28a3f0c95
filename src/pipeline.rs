use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    enrich::{Clock, enrich},
    error::PipelineError,
    exchange_rate::CurrencyCode,
    export::write_table,
    fetch::RateSource,
    parse::parse_rates,
    summary::{Summary, summarize},
    validate::{ValidationReport, validate},
};

/// What one run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub fetched: usize,
    pub exported: usize,
    pub validation: ValidationReport,
    pub summary: Summary,
    pub output: PathBuf,
}

/// Fetch, parse, validate, enrich, summarize and export one snapshot.
///
/// Fetch and parse failures abort before anything touches the disk. The
/// summary is logged before export, so the extrema are visible even when the
/// write fails. The export is verified before it replaces `output`.
pub async fn run_pipeline<S, C>(
    source: &S,
    clock: &C,
    base: &CurrencyCode,
    output: &Path,
) -> Result<PipelineReport, PipelineError>
where
    S: RateSource,
    C: Clock,
{
    let ingested_at = clock.now();
    debug!("Ingestion timestamp for this run: {}", ingested_at);

    let payload = source.fetch_latest(base).await?;
    let raw = parse_rates(&payload)?;
    drop(payload);
    info!("Parsed {} {} conversion rates", raw.len(), base);

    let validated = validate(&raw);
    let table = enrich(validated.rows, ingested_at);

    let summary = summarize(&table)?;
    summary.log();

    write_table(&table, output)?;

    Ok(PipelineReport {
        fetched: raw.len(),
        exported: table.len(),
        validation: validated.report,
        summary,
        output: output.to_path_buf(),
    })
}
