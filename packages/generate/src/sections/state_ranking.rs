//! State rankings, the 2025 national comparison and month-over-month
//! changes per state.

use sinaloa_report_analytics::monthly::{most_variable_states, state_monthly_changes};
use sinaloa_report_analytics::ranking::{
    national_aggregate, national_comparison, national_rates, rate_ranking_tables, ranking_tables,
    state_rate_rows, state_rows,
};
use sinaloa_report_analytics_models::EntityRow;
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::states::abbreviate;
use sinaloa_report_geography_models::{NATIONAL_NAME, names_match};
use sinaloa_report_source::DatasetId;

use super::{ReportContext, change_class, crime_headers, ranking_table_models};
use crate::GenerateError;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section, TableCell, TableModel};

/// Year of the state-level comparison dataset.
const COMPARISON_YEAR: u16 = 2025;

const STATE_PALETTE: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#34495e", "#e67e22",
];

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    rankings(ctx, section)?;
    comparison(ctx, section)?;
    variable_states(ctx, section)
}

fn rankings(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = ctx.data;
    let report = &ctx.config.report;
    let rows = data.table(DatasetId::StateMonthly);
    let source = data.source_line(DatasetId::StateMonthly);
    let highlight = Some(report.highlight.as_str());

    let absolute = ranking_tables(rows, report.crime, report.top_n, highlight);
    section.tables.extend(ranking_table_models(
        "ranking",
        &format!("Top {} estados", report.top_n),
        &absolute,
        0,
        &source,
    ));

    let rates = rate_ranking_tables(rows, &data.population, report.crime, report.top_n, highlight);
    section.tables.extend(ranking_table_models(
        "rate_ranking",
        &format!("Top {} estados por tasa", report.top_n),
        &rates,
        2,
        &source,
    ));

    section.metric("rankings", &absolute)?;
    section.metric("rateRankings", &rates)?;
    Ok(())
}

fn comparison_table(
    id: &str,
    title: &str,
    rows: &[EntityRow],
    decimals: usize,
    highlight: &str,
    source: &str,
) -> TableModel {
    let mut table = TableModel::new(id, title, crime_headers(&["Entidad"])).with_source(source);
    for row in rows {
        let cells = std::iter::once(TableCell::text(&row.name))
            .chain(CrimeType::all().iter().map(|crime| {
                TableCell::decimal(row.values.get(crime).copied().unwrap_or(0.0), decimals)
            }))
            .collect();
        let highlighted = row.name == NATIONAL_NAME || names_match(&row.name, highlight);
        table.push_row(cells, highlighted);
    }
    table
}

fn comparison(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = ctx.data;
    let rows = data.table(DatasetId::State2025);
    if rows.is_empty() {
        return Ok(());
    }
    let source = data.source_line(DatasetId::State2025);
    let highlight = ctx.config.report.highlight.as_str();

    let states = state_rows(rows);
    let mut stacked = ChartConfig::new(
        "states_2025_stacked",
        ChartKind::Bar,
        format!("Violencia homicida por estado, {COMPARISON_YEAR}"),
        states.iter().map(|s| abbreviate(&s.name)).collect(),
    )
    .with_y_axis("Número de casos");
    for &crime in CrimeType::components() {
        stacked = stacked.with_dataset(ChartDataset::new(
            crime.label(),
            states
                .iter()
                .map(|s| s.values.get(&crime).copied().unwrap_or(0.0))
                .collect(),
            crime.color(),
        ));
    }
    section.charts.push(stacked);

    let absolute = national_comparison(national_aggregate(rows), states);
    section.tables.push(comparison_table(
        "states_2025",
        &format!("Casos por entidad, {COMPARISON_YEAR}"),
        &absolute,
        0,
        highlight,
        &source,
    ));

    let rates = national_comparison(
        national_rates(rows, &data.population, COMPARISON_YEAR),
        state_rate_rows(rows, &data.population, COMPARISON_YEAR),
    );
    section.tables.push(comparison_table(
        "states_2025_rates",
        &format!("Tasas por cada 100 mil habitantes, {COMPARISON_YEAR}"),
        &rates,
        2,
        highlight,
        &source,
    ));

    section.metric("nationalComparison", &absolute)?;
    section.metric("nationalRateComparison", &rates)?;
    Ok(())
}

fn variable_states(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = ctx.data;
    let report = &ctx.config.report;
    let rows = data.table(DatasetId::StateMonthly);
    if rows.is_empty() {
        return Ok(());
    }

    let changes = state_monthly_changes(
        rows,
        data.table(DatasetId::StateDecember2023),
        report.crime,
    );
    let featured: Vec<&str> = report.featured_states.iter().map(String::as_str).collect();
    let required: Vec<&str> = report.required_states.iter().map(String::as_str).collect();
    let picked = most_variable_states(&changes, report.variable_states, &featured, &required);

    let periods: Vec<String> = changes
        .iter()
        .map(|c| c.changes.iter().map(|v| v.period.clone()).collect::<Vec<_>>())
        .max_by_key(Vec::len)
        .unwrap_or_default();

    let mut chart = ChartConfig::new(
        "state_monthly_changes",
        ChartKind::Line,
        format!("Cambio porcentual mensual por estado - {}", report.crime.label()),
        periods.clone(),
    )
    .with_y_axis("Cambio (%)");
    for (index, name) in picked.iter().enumerate() {
        let Some(state) = changes.iter().find(|c| &c.state == name) else {
            continue;
        };
        let values = periods
            .iter()
            .map(|p| {
                state
                    .changes
                    .iter()
                    .find(|c| &c.period == p)
                    .map_or(0.0, |c| c.value)
            })
            .collect();
        chart = chart.with_dataset(ChartDataset::new(
            name,
            values,
            STATE_PALETTE[index % STATE_PALETTE.len()],
        ));
    }
    section.charts.push(chart);

    let mut table = TableModel::new(
        "state_monthly_changes_table",
        format!("Cambio porcentual mensual por estado - {}", report.crime.label()),
        std::iter::once("Estado".to_string())
            .chain(periods.iter().cloned())
            .collect(),
    )
    .with_source(data.source_line(DatasetId::StateMonthly));
    for state in &changes {
        let cells = std::iter::once(TableCell::text(&state.state))
            .chain(periods.iter().map(|p| {
                state.changes.iter().find(|c| &c.period == p).map_or_else(
                    || TableCell::text("-"),
                    |c| TableCell::percent(c.value).with_class(change_class(c.value)),
                )
            }))
            .collect();
        table.push_row(cells, names_match(&state.state, &report.highlight));
    }
    section.tables.push(table);

    section.metric("variableStates", &picked)?;
    Ok(())
}
