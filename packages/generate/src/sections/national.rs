//! National annual and monthly views.

use sinaloa_report_analytics::monthly::{
    december_baseline, national_monthly_changes, national_monthly_totals,
};
use sinaloa_report_analytics_models::CrimeValues;
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::NATIONAL_CLAVE;
use sinaloa_report_source::DatasetId;

use super::ReportContext;
use super::annual::{Scope, annual_views, monthly_views};
use crate::GenerateError;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section};

const SCOPE: Scope<'static> = Scope {
    prefix: "national",
    place: "Nacional",
    clave: NATIONAL_CLAVE,
};

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = ctx.data;

    annual_views(
        section,
        &SCOPE,
        data.table(DatasetId::NationalAnnual),
        &data.population,
        &data.source_line(DatasetId::NationalAnnual),
    )?;

    let baseline = december_baseline(data.table(DatasetId::StateDecember2023));
    monthly_views(
        section,
        &SCOPE,
        data.table(DatasetId::NationalMonthly),
        &baseline,
        &data.source_line(DatasetId::NationalMonthly),
    )?;

    state_sum_views(ctx, section, &baseline)
}

/// Monthly national figures recomputed by summing every state row.
fn state_sum_views(
    ctx: &ReportContext<'_>,
    section: &mut Section,
    baseline: &CrimeValues,
) -> Result<(), GenerateError> {
    let rows = ctx.data.table(DatasetId::StateMonthly);
    if rows.is_empty() {
        return Ok(());
    }

    let crime = ctx.config.report.crime;
    let totals = national_monthly_totals(rows, crime);
    let labels: Vec<String> = totals.iter().map(|t| t.period.clone()).collect();

    section.charts.push(
        ChartConfig::new(
            "national_state_sum",
            ChartKind::Line,
            format!("{} a nivel nacional por mes (suma estatal)", crime.label()),
            labels.clone(),
        )
        .with_y_axis("Número de casos")
        .with_dataset(ChartDataset::new(
            crime.label(),
            totals.iter().map(|t| t.value).collect(),
            crime.color(),
        )),
    );

    let mut changes = ChartConfig::new(
        "national_state_sum_changes",
        ChartKind::Bar,
        "Cambio porcentual mensual nacional",
        labels,
    )
    .with_y_axis("Cambio (%)");
    for &crime in CrimeType::all() {
        let values = national_monthly_changes(rows, crime, baseline);
        changes = changes.with_dataset(ChartDataset::new(
            crime.label(),
            values.iter().map(|v| v.value).collect(),
            crime.color(),
        ));
    }
    section.charts.push(changes);
    section.metric(
        "stateSumChanges",
        &national_monthly_changes(rows, crime, baseline),
    )?;

    Ok(())
}
