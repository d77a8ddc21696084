//! Annual and monthly views shared by the national and Sinaloa sections.
//!
//! Both sections read the same dataset shapes: an annual table with one
//! row per `Delito` and one column per year, and a monthly table with one
//! row per `Periodo`. Only the entity, its population key and the December
//! 2023 baseline differ.

use sinaloa_report_analytics::annual::{
    REPORT_YEARS, annual_rates, annual_series, contribution_analysis, summary_cards,
    year_over_year_changes,
};
use sinaloa_report_analytics::monthly::{PERIOD_COLUMN, month_over_month_changes};
use sinaloa_report_analytics_models::{AnnualRateRow, ContributionAnalysis, CrimeValues};
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_source_models::{CrimeRecord, PopulationTable};

use super::change_table;
use crate::GenerateError;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section, TableCell, TableModel};

/// Which entity the views describe.
pub struct Scope<'a> {
    /// Prefix for chart and table ids.
    pub prefix: &'a str,
    /// Display name, e.g. `Nacional` or `Sinaloa`.
    pub place: &'a str,
    /// `Clave_Entidad` used for population lookups.
    pub clave: u32,
}

fn year_labels() -> Vec<String> {
    REPORT_YEARS.iter().map(ToString::to_string).collect()
}

/// Summary cards, annual counts, rates, year-over-year changes and the
/// 2024→2025 contribution analysis.
pub fn annual_views(
    section: &mut Section,
    scope: &Scope<'_>,
    rows: &[CrimeRecord],
    population: &PopulationTable,
    source: &str,
) -> Result<(), GenerateError> {
    if rows.is_empty() {
        log::warn!("No annual data for {}", scope.place);
        return Ok(());
    }

    section.metric("summaryCards", &summary_cards(rows, &REPORT_YEARS))?;

    let mut counts = ChartConfig::new(
        &format!("{}_annual", scope.prefix),
        ChartKind::Line,
        format!("Violencia homicida anual - {}", scope.place),
        year_labels(),
    )
    .with_y_axis("Número de casos");
    let mut table = TableModel::new(
        &format!("{}_annual_table", scope.prefix),
        format!("Casos por año - {}", scope.place),
        std::iter::once("Delito".to_string())
            .chain(year_labels())
            .chain(std::iter::once("Total".to_string()))
            .collect(),
    )
    .with_source(source);

    for &crime in CrimeType::all() {
        let series = annual_series(rows, crime, &REPORT_YEARS);
        let total: f64 = series.iter().sum();
        table.push_row(
            std::iter::once(TableCell::text(crime.label()))
                .chain(series.iter().map(|v| TableCell::count(*v)))
                .chain(std::iter::once(TableCell::count(total)))
                .collect(),
            crime == CrimeType::Total,
        );
        counts = counts.with_dataset(ChartDataset::new(crime.label(), series, crime.color()));
    }
    section.charts.push(counts);
    section.tables.push(table);

    rate_views(section, scope, &annual_rates(rows, population, scope.clave, &REPORT_YEARS), source);

    let changes = year_over_year_changes(rows, &REPORT_YEARS);
    let mut changes_chart = ChartConfig::new(
        &format!("{}_yearly_changes", scope.prefix),
        ChartKind::Bar,
        format!("Cambio porcentual anual - {}", scope.place),
        year_labels(),
    )
    .with_y_axis("Cambio (%)");
    for row in &changes {
        let color = row.crime.map_or("#7f8c8d", CrimeType::color);
        changes_chart = changes_chart.with_dataset(ChartDataset::new(
            &row.label,
            row.changes.iter().map(|c| c.value).collect(),
            color,
        ));
    }
    section.charts.push(changes_chart);
    section.tables.push(
        change_table(
            &format!("{}_yearly_changes_table", scope.prefix),
            &format!("Cambio porcentual anual - {}", scope.place),
            "Delito",
            &changes,
        )
        .with_source(source),
    );
    section.metric("yearlyChanges", &changes)?;

    let contribution = contribution_analysis(rows, 2024, 2025);
    section
        .tables
        .push(contribution_table(scope, &contribution).with_source(source));
    section.metric("contribution", &contribution)?;

    Ok(())
}

fn rate_views(section: &mut Section, scope: &Scope<'_>, rates: &[AnnualRateRow], source: &str) {
    let mut chart = ChartConfig::new(
        &format!("{}_annual_rates", scope.prefix),
        ChartKind::Line,
        format!("Tasa por cada 100 mil habitantes - {}", scope.place),
        year_labels(),
    )
    .with_y_axis("Tasa por 100 mil habitantes");
    let mut table = TableModel::new(
        &format!("{}_annual_rates_table", scope.prefix),
        format!("Tasas por cada 100 mil habitantes - {}", scope.place),
        std::iter::once("Delito".to_string())
            .chain(year_labels())
            .chain(std::iter::once("Total".to_string()))
            .collect(),
    )
    .with_source(source);

    for row in rates {
        let values: Vec<f64> = REPORT_YEARS
            .iter()
            .map(|year| row.by_year.get(year).copied().unwrap_or(0.0))
            .collect();
        let crime = CrimeType::from_column(&row.label);
        table.push_row(
            std::iter::once(TableCell::text(&row.label))
                .chain(values.iter().map(|v| TableCell::decimal(*v, 2)))
                .chain(std::iter::once(TableCell::decimal(row.total, 2)))
                .collect(),
            crime == Some(CrimeType::Total),
        );
        chart = chart.with_dataset(ChartDataset::new(
            &row.label,
            values,
            crime.map_or("#7f8c8d", CrimeType::color),
        ));
    }

    section.charts.push(chart);
    section.tables.push(table);
}

fn contribution_table(scope: &Scope<'_>, analysis: &ContributionAnalysis) -> TableModel {
    let mut table = TableModel::new(
        &format!("{}_contribution", scope.prefix),
        format!(
            "Contribución al cambio {}-{} - {}",
            analysis.from_year, analysis.to_year, scope.place
        ),
        vec![
            "Delito".to_string(),
            analysis.from_year.to_string(),
            analysis.to_year.to_string(),
            "Cambio absoluto".to_string(),
            "Cambio relativo".to_string(),
            "Peso en el cambio".to_string(),
        ],
    );
    for row in &analysis.rows {
        table.push_row(
            vec![
                TableCell::text(row.crime.label()),
                TableCell::count(row.previous),
                TableCell::count(row.current),
                TableCell::count(row.absolute_change),
                TableCell::percent(row.relative_change),
                TableCell::decimal(row.weight, 1),
            ],
            false,
        );
    }
    table.push_row(
        vec![
            TableCell::text("Total"),
            TableCell::count(analysis.previous_total),
            TableCell::count(analysis.current_total),
            TableCell::count(analysis.total_change),
            TableCell::percent(analysis.total_relative_change),
            TableCell::decimal(100.0, 1),
        ],
        true,
    );
    table
}

/// Monthly counts (components as bars, total as a line) and their
/// month-over-month changes.
pub fn monthly_views(
    section: &mut Section,
    scope: &Scope<'_>,
    rows: &[CrimeRecord],
    baseline: &CrimeValues,
    source: &str,
) -> Result<(), GenerateError> {
    if rows.is_empty() {
        log::warn!("No monthly data for {}", scope.place);
        return Ok(());
    }

    let labels: Vec<String> = rows
        .iter()
        .map(|row| row.text(PERIOD_COLUMN).to_string())
        .collect();

    let mut chart = ChartConfig::new(
        &format!("{}_monthly", scope.prefix),
        ChartKind::Bar,
        format!("Violencia homicida mensual - {}", scope.place),
        labels.clone(),
    )
    .with_y_axis("Número de casos");
    let mut table = TableModel::new(
        &format!("{}_monthly_table", scope.prefix),
        format!("Casos por mes - {}", scope.place),
        super::crime_headers(&["Periodo"]),
    )
    .with_source(source);

    for &crime in CrimeType::all() {
        let values: Vec<f64> = rows.iter().map(|row| row.crime(crime)).collect();
        let mut dataset = ChartDataset::new(crime.label(), values, crime.color());
        if crime == CrimeType::Total {
            dataset = dataset.with_kind(ChartKind::Line);
        }
        chart = chart.with_dataset(dataset);
    }
    for (label, row) in labels.iter().zip(rows) {
        table.push_row(
            std::iter::once(TableCell::text(label))
                .chain(CrimeType::all().iter().map(|&c| TableCell::count(row.crime(c))))
                .collect(),
            false,
        );
    }
    section.charts.push(chart);
    section.tables.push(table);

    let changes = month_over_month_changes(rows, baseline);
    section.tables.push(
        change_table(
            &format!("{}_monthly_changes", scope.prefix),
            &format!("Cambio porcentual mensual - {}", scope.place),
            "Delito",
            &changes,
        )
        .with_source(source),
    );
    section.metric("monthlyChanges", &changes)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annual_rows() -> Vec<CrimeRecord> {
        vec![
            CrimeRecord::from_pairs(&[("Delito", "Homicidio doloso"), ("2024", "100"), ("2025", "150")]),
            CrimeRecord::from_pairs(&[("Delito", "Feminicidio"), ("2024", "10"), ("2025", "5")]),
            CrimeRecord::from_pairs(&[("Delito", "Total"), ("2024", "110"), ("2025", "155")]),
        ]
    }

    const SCOPE: Scope<'static> = Scope {
        prefix: "sinaloa",
        place: "Sinaloa",
        clave: 25,
    };

    #[test]
    fn annual_views_fill_charts_tables_and_metrics() {
        let mut section = Section::new("sinaloa", "Sinaloa");
        let mut population = PopulationTable::new();
        population.insert(25, 2025, 3_100_000);
        annual_views(&mut section, &SCOPE, &annual_rows(), &population, "Fuente: SESNSP.").unwrap();

        let ids: Vec<&str> = section.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["sinaloa_annual", "sinaloa_annual_rates", "sinaloa_yearly_changes"]);
        assert_eq!(section.charts[0].datasets.len(), CrimeType::all().len());
        assert_eq!(section.metrics["summaryCards"]["variation"], serde_json::json!(40.9));

        let contribution = section
            .tables
            .iter()
            .find(|t| t.id == "sinaloa_contribution")
            .unwrap();
        // two component rows plus the totals row
        assert_eq!(contribution.rows.len(), 3);
        assert_eq!(contribution.highlighted_rows, vec![2]);
        assert_eq!(contribution.rows[0][3].text, "50");
    }

    #[test]
    fn empty_annual_rows_add_nothing() {
        let mut section = Section::new("national", "Nacional");
        annual_views(&mut section, &SCOPE, &[], &PopulationTable::new(), "").unwrap();
        assert!(section.is_empty());
        assert!(section.metrics.is_empty());
    }

    #[test]
    fn monthly_total_is_drawn_as_a_line() {
        let rows = vec![
            CrimeRecord::from_pairs(&[("Periodo", "Enero 2024"), ("Total", "100")]),
            CrimeRecord::from_pairs(&[("Periodo", "Febrero 2024"), ("Total", "120")]),
        ];
        let mut baseline = CrimeValues::new();
        baseline.insert(CrimeType::Total, 80.0);
        let mut section = Section::new("sinaloa", "Sinaloa");
        monthly_views(&mut section, &SCOPE, &rows, &baseline, "").unwrap();

        let chart = &section.charts[0];
        assert_eq!(chart.labels, vec!["Enero 2024", "Febrero 2024"]);
        let total = chart.datasets.last().unwrap();
        assert_eq!(total.kind, Some(ChartKind::Line));

        let changes = section
            .tables
            .iter()
            .find(|t| t.id == "sinaloa_monthly_changes")
            .unwrap();
        let total_row = &changes.rows[changes.highlighted_rows[0]];
        assert_eq!(total_row[1].text, "+25.0%");
        assert_eq!(total_row[2].text, "+20.0%");
    }
}
