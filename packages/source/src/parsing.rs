//! CSV and population-table parsing.
//!
//! Rows come back as [`CrimeRecord`]s keyed by the trimmed header row.
//! Values are trimmed text; missing trailing cells become `""` and blank
//! lines are skipped.

use std::sync::LazyLock;

use regex::Regex;
use sinaloa_report_source_models::{CrimeRecord, PopulationTable};

use crate::SourceError;

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("valid regex"));

/// Parses plain comma-separated text. Double quotes are not special.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the reader fails on malformed input.
pub fn parse_csv(text: &str) -> Result<Vec<CrimeRecord>, SourceError> {
    parse_records(text, false)
}

/// Parses comma-separated text where fields may be wrapped in double
/// quotes. Commas inside quotes do not split, and quote characters are
/// removed from headers and values.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the reader fails on malformed input.
pub fn parse_quoted_csv(text: &str) -> Result<Vec<CrimeRecord>, SourceError> {
    parse_records(text, true)
}

fn clean(value: &str, quoted: bool) -> String {
    if quoted {
        value.replace('"', "").trim().to_owned()
    } else {
        value.trim().to_owned()
    }
}

fn parse_records(text: &str, quoted: bool) -> Result<Vec<CrimeRecord>, SourceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .quoting(quoted)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| clean(h.trim_start_matches('\u{feff}'), quoted))
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), clean(record.get(i).unwrap_or(""), quoted)))
            .collect();
        records.push(CrimeRecord::new(fields));
    }

    log::debug!("Parsed {} records ({} columns)", records.len(), headers.len());
    Ok(records)
}

/// Parses a raw population cell: every non-digit character is removed
/// before parsing, so `"3,026,943"` and `"3 026 943 "` both read as
/// `3026943`. Empty or zero cells yield `None`.
#[must_use]
pub fn parse_population(text: &str) -> Option<u64> {
    let digits = NON_DIGITS.replace_all(text, "");
    digits.parse::<u64>().ok().filter(|p| *p > 0)
}

/// Builds a [`PopulationTable`] from rows keyed by `Clave_Entidad` with one
/// column per year. The first row for a given clave wins.
#[must_use]
pub fn population_table(records: &[CrimeRecord]) -> PopulationTable {
    let mut table = PopulationTable::new();

    for record in records {
        let Ok(clave) = record.text("Clave_Entidad").trim().parse::<u32>() else {
            continue;
        };
        if table.contains(clave) {
            continue;
        }

        for (header, value) in record.fields() {
            let Ok(year) = header.trim().parse::<u16>() else {
                continue;
            };
            if let Some(population) = parse_population(value) {
                table.insert(clave, year, population);
            }
        }
    }

    log::debug!("Population table covers {} entities", table.len());
    table
}
