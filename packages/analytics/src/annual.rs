//! Annual tables: rates, year-over-year changes, contribution analysis and
//! the summary cards.
//!
//! Annual datasets have one row per crime (`Delito`) and one column per
//! year. The last row holds the total.

use std::collections::BTreeMap;

use sinaloa_report_analytics_models::{
    AnnualRateRow, ChangeRow, ContributionAnalysis, ContributionRow, PeriodValue, SummaryCards,
};
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_source_models::{CrimeRecord, PopulationTable};

use crate::metrics::{percent_change, rate_per_100k, round_to};

/// Years shown in the annual tables.
pub const REPORT_YEARS: [u16; 7] = [2019, 2020, 2021, 2022, 2023, 2024, 2025];

/// Label of the totals row in change tables.
pub const TOTAL_ROW_LABEL: &str = "TOTAL VIOLENCIA HOMICIDA";

/// Column holding the crime name in annual datasets.
pub const DELITO_COLUMN: &str = "Delito";

/// Finds the row for a crime type by its `Delito` cell.
#[must_use]
pub fn delito_row(rows: &[CrimeRecord], crime: CrimeType) -> Option<&CrimeRecord> {
    rows.iter()
        .find(|row| CrimeType::from_column(row.text(DELITO_COLUMN)) == Some(crime))
}

fn year_count(row: &CrimeRecord, year: u16) -> f64 {
    row.count(&year.to_string())
}

fn delito_label(row: &CrimeRecord) -> String {
    let delito = row.text(DELITO_COLUMN);
    CrimeType::from_column(delito).map_or_else(|| delito.to_owned(), |c| c.label().to_owned())
}

/// Counts of one crime type across `years`; zeros when the row is absent.
/// [`CrimeType::Total`] falls back to the last row.
#[must_use]
pub fn annual_series(rows: &[CrimeRecord], crime: CrimeType, years: &[u16]) -> Vec<f64> {
    let row = match crime {
        CrimeType::Total => delito_row(rows, crime).or_else(|| rows.last()),
        _ => delito_row(rows, crime),
    };
    row.map_or_else(
        || vec![0.0; years.len()],
        |row| years.iter().map(|&y| year_count(row, y)).collect(),
    )
}

/// Converts every annual row into rates per 100k for the entity `clave`.
///
/// The `total` column is the rate of all cases over the summed population
/// divided by the number of years.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn annual_rates(
    rows: &[CrimeRecord],
    population: &PopulationTable,
    clave: u32,
    years: &[u16],
) -> Vec<AnnualRateRow> {
    rows.iter()
        .map(|row| {
            let mut by_year = BTreeMap::new();
            for &year in years {
                let pop = population.population(clave, year);
                if pop.is_none() {
                    log::debug!(
                        "No population for clave {clave} in {year} ({})",
                        row.text(DELITO_COLUMN)
                    );
                }
                by_year.insert(year, rate_per_100k(year_count(row, year), pop));
            }

            let cases: f64 = years.iter().map(|&y| year_count(row, y)).sum();
            let population_sum: u64 = years
                .iter()
                .filter_map(|&y| population.population(clave, y))
                .sum();
            let mean_population = population_sum as f64 / years.len().max(1) as f64;
            let total = if mean_population > 0.0 {
                cases / mean_population * 100_000.0
            } else {
                0.0
            };

            AnnualRateRow {
                label: delito_label(row),
                by_year,
                total,
            }
        })
        .collect()
}

fn change_row(label: String, crime: Option<CrimeType>, row: &CrimeRecord, years: &[u16]) -> ChangeRow {
    ChangeRow {
        label,
        crime,
        changes: years
            .iter()
            .map(|&year| PeriodValue {
                period: year.to_string(),
                value: percent_change(year_count(row, year), year_count(row, year - 1)),
            })
            .collect(),
    }
}

/// Year-over-year percent change for each component crime found in
/// `rows`, followed by a totals row computed from the last data row.
#[must_use]
pub fn year_over_year_changes(rows: &[CrimeRecord], years: &[u16]) -> Vec<ChangeRow> {
    let mut changes: Vec<ChangeRow> = CrimeType::components()
        .iter()
        .filter_map(|&crime| {
            delito_row(rows, crime)
                .map(|row| change_row(crime.label().to_owned(), Some(crime), row, years))
        })
        .collect();

    if let Some(last) = rows.last() {
        changes.push(change_row(
            TOTAL_ROW_LABEL.to_owned(),
            Some(CrimeType::Total),
            last,
            years,
        ));
    }

    changes
}

/// How each crime type contributed to the change from `from_year` to
/// `to_year`.
#[must_use]
pub fn contribution_analysis(
    rows: &[CrimeRecord],
    from_year: u16,
    to_year: u16,
) -> ContributionAnalysis {
    let mut contributions: Vec<ContributionRow> = CrimeType::components()
        .iter()
        .filter_map(|&crime| {
            let row = delito_row(rows, crime)?;
            let previous = year_count(row, from_year);
            let current = year_count(row, to_year);
            Some(ContributionRow {
                crime,
                previous,
                current,
                absolute_change: current - previous,
                relative_change: percent_change(current, previous),
                weight: 0.0,
            })
        })
        .collect();

    let previous_total: f64 = contributions.iter().map(|c| c.previous).sum();
    let current_total: f64 = contributions.iter().map(|c| c.current).sum();
    let total_change = current_total - previous_total;

    if total_change != 0.0 {
        for c in &mut contributions {
            c.weight = c.absolute_change / total_change * 100.0;
        }
    }

    ContributionAnalysis {
        from_year,
        to_year,
        rows: contributions,
        previous_total,
        current_total,
        total_change,
        total_relative_change: percent_change(current_total, previous_total),
    }
}

/// Headline figures: totals over `years` and the change of the last year
/// against the one before it.
#[must_use]
pub fn summary_cards(rows: &[CrimeRecord], years: &[u16]) -> SummaryCards {
    let sum = |row: Option<&CrimeRecord>| -> f64 {
        row.map_or(0.0, |row| years.iter().map(|&y| year_count(row, y)).sum())
    };

    let total_row = rows.last();
    let variation = match (total_row, years.last()) {
        (Some(row), Some(&last)) => round_to(
            percent_change(year_count(row, last), year_count(row, last - 1)),
            1,
        ),
        _ => 0.0,
    };

    SummaryCards {
        total_violence: sum(total_row),
        homicidio_doloso: sum(delito_row(rows, CrimeType::HomicidioDoloso)),
        feminicidio: sum(delito_row(rows, CrimeType::Feminicidio)),
        variation,
    }
}
