//! Sinaloa's annual and monthly views.

use sinaloa_report_analytics::monthly::{STATE_COLUMN, sum_rows};
use sinaloa_report_analytics_models::CrimeValues;
use sinaloa_report_geography_models::names_match;
use sinaloa_report_geography_models::states::clave_for;
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::ReportContext;
use super::annual::{Scope, annual_views, monthly_views};
use crate::GenerateError;
use crate::view::Section;

const STATE: &str = "Sinaloa";

/// Sinaloa's own December 2023 row. Empty when absent, so January 2024
/// reports no change rather than a change against national figures.
fn sinaloa_baseline(december: &[CrimeRecord]) -> CrimeValues {
    let rows: Vec<&CrimeRecord> = december
        .iter()
        .filter(|row| names_match(row.text(STATE_COLUMN), STATE))
        .collect();
    if rows.is_empty() {
        log::warn!("No December 2023 row for {STATE}; January 2024 has no baseline");
        return CrimeValues::new();
    }
    sum_rows(rows.into_iter())
}

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = ctx.data;
    let scope = Scope {
        prefix: "sinaloa",
        place: STATE,
        clave: clave_for(STATE).unwrap_or(25),
    };

    annual_views(
        section,
        &scope,
        data.table(DatasetId::SinaloaAnnual),
        &data.population,
        &data.source_line(DatasetId::SinaloaAnnual),
    )?;

    monthly_views(
        section,
        &scope,
        data.table(DatasetId::SinaloaMonthly),
        &sinaloa_baseline(data.table(DatasetId::StateDecember2023)),
        &data.source_line(DatasetId::SinaloaMonthly),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinaloa_report_crime_models::CrimeType;
    use sinaloa_report_source::ReportData;

    use crate::sections::test_support::config;

    #[test]
    fn baseline_uses_only_the_sinaloa_row() {
        let december = vec![
            CrimeRecord::from_pairs(&[("Estado", "Sonora"), ("Total", "70")]),
            CrimeRecord::from_pairs(&[("Estado", "Sinaloa"), ("Total", "100")]),
        ];
        let baseline = sinaloa_baseline(&december);
        assert_eq!(baseline.get(&CrimeType::Total), Some(&100.0));
        assert!(sinaloa_baseline(&december[..1]).is_empty());
    }

    #[test]
    fn rates_use_sinaloa_population() {
        let config = config();
        let mut data = ReportData::default();
        data.insert_table(
            DatasetId::SinaloaAnnual,
            vec![CrimeRecord::from_pairs(&[("Delito", "Total"), ("2025", "1550")])],
        );
        data.insert_table(
            DatasetId::Population,
            vec![CrimeRecord::from_pairs(&[("Clave_Entidad", "25"), ("2025", "3100000")])],
        );
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("sinaloa", "Sinaloa");
        build(&ctx, &mut section).unwrap();

        let rates = section
            .tables
            .iter()
            .find(|t| t.id == "sinaloa_annual_rates_table")
            .unwrap();
        // 2019..2025, 2025 is the seventh year column
        assert_eq!(rates.rows[0][7].text, "50.00");
    }
}
