//! CSV export for the downstream bulk loader.
//!
//! The loader skips the first row and maps columns by position into
//! `VARCHAR, FLOAT, FLOAT, DATETIME`, so the header and column order below are
//! a contract. Files are written to a hidden sibling, read back and compared
//! with the table, and only then renamed into place; a failed or interrupted
//! run leaves the previous file untouched.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    error::PipelineError,
    exchange_rate::{RateRecord, RateTable, TIMESTAMP_FORMAT},
};

pub const HEADER: [&str; 4] = [
    "currency",
    "exchange_rate",
    "exchange_rate_%",
    "ingestion_timestamp",
];

/// Shortest form that parses back to the same `f64`, always with a decimal
/// point or exponent (`120.0`, not `120`).
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn write_rows<W: Write>(out: W, table: &RateTable) -> io::Result<W> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(HEADER)?;
    for record in table.records() {
        let rate = format_float(record.exchange_rate);
        let percent = format_float(record.exchange_rate_percent);
        let ingested_at = record.ingestion_timestamp.format(TIMESTAMP_FORMAT).to_string();
        wtr.write_record([
            record.currency.as_str(),
            rate.as_str(),
            percent.as_str(),
            ingested_at.as_str(),
        ])?;
    }

    wtr.into_inner().map_err(|e| e.into_error())
}

fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;
    Ok(path.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

fn write_atomically(table: &RateTable, path: &Path) -> io::Result<()> {
    let tmp_path = temp_path_for(path)?;

    let result = File::create(&tmp_path)
        .and_then(|file| write_rows(file, table))
        .and_then(|file| file.sync_all())
        .and_then(|()| verify_written(&tmp_path, table))
        .and_then(|()| fs::rename(&tmp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Writes `table` to `path`, replacing any previous file.
pub fn write_table(table: &RateTable, path: &Path) -> Result<(), PipelineError> {
    if table.is_empty() {
        return Err(PipelineError::EmptyTable { stage: "export" });
    }

    write_atomically(table, path).map_err(|e| PipelineError::io(path, e))?;

    info!("Wrote {} rates to {}", table.len(), path.display());
    Ok(())
}

fn read_records(path: &Path) -> io::Result<Vec<RateRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = rdr.headers()?;
    if headers.iter().ne(HEADER) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
        ));
    }

    let mut records = Vec::new();
    for record in rdr.deserialize::<RateRecord>() {
        records.push(record?);
    }
    Ok(records)
}

/// The file at `path` must read back as exactly the rows of `table`.
fn verify_written(path: &Path, table: &RateTable) -> io::Result<()> {
    let written = read_records(path)?;
    if written != table.records() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "read back {} rows that do not match the {} written",
                written.len(),
                table.len()
            ),
        ));
    }
    Ok(())
}

/// Reads a file produced by [`write_table`], rejecting anything whose header
/// differs from [`HEADER`].
pub fn read_table(path: &Path) -> Result<Vec<RateRecord>, PipelineError> {
    read_records(path).map_err(|e| PipelineError::io(path, e))
}
