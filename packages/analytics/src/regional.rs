//! Regional sums over Sinaloa's four static regions.

use sinaloa_report_analytics_models::{MemberValue, RegionalTableRow, RegionalTotal};
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::Region;
use sinaloa_report_source_models::CrimeRecord;

use crate::monthly::PERIOD_COLUMN;
use crate::ranking::MUNICIPALITY_COLUMN;

/// Totals of `crime` per region for one period, in region order.
///
/// Rows for municipalities outside every region are skipped.
#[must_use]
pub fn regional_totals(rows: &[CrimeRecord], period: &str, crime: CrimeType) -> Vec<RegionalTotal> {
    let period_rows: Vec<&CrimeRecord> = rows
        .iter()
        .filter(|row| row.text(PERIOD_COLUMN) == period)
        .collect();

    for row in &period_rows {
        let name = row.text(MUNICIPALITY_COLUMN);
        if Region::of(name).is_none() {
            log::debug!("Municipality '{name}' belongs to no region");
        }
    }

    Region::all()
        .iter()
        .map(|&region| {
            let mut members: Vec<MemberValue> = period_rows
                .iter()
                .filter(|row| Region::of(row.text(MUNICIPALITY_COLUMN)) == Some(region))
                .map(|row| MemberValue {
                    municipality: row.text(MUNICIPALITY_COLUMN).to_owned(),
                    value: row.crime(crime),
                })
                .collect();

            let total = members.iter().map(|m| m.value).sum();
            members.retain(|m| m.value > 0.0);
            members.sort_by(|a, b| b.value.total_cmp(&a.value));

            RegionalTotal {
                region: region.name().to_owned(),
                total,
                members,
            }
        })
        .collect()
}

/// One row per region with its total in each period and across all of them.
#[must_use]
pub fn regional_table(
    rows: &[CrimeRecord],
    periods: &[String],
    crime: CrimeType,
) -> Vec<RegionalTableRow> {
    let per_period: Vec<Vec<RegionalTotal>> = periods
        .iter()
        .map(|period| regional_totals(rows, period, crime))
        .collect();

    Region::all()
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let values: Vec<f64> = per_period.iter().map(|totals| totals[index].total).collect();
            RegionalTableRow {
                region: region.name().to_owned(),
                total: values.iter().sum(),
                values,
            }
        })
        .collect()
}

/// Regions ranked by their total for one period, highest first.
#[must_use]
pub fn regional_ranking(rows: &[CrimeRecord], period: &str, crime: CrimeType) -> Vec<RegionalTotal> {
    let mut totals = regional_totals(rows, period, crime);
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}
