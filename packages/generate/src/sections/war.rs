//! Before and after September 2024, per municipality and for the state.

use std::collections::BTreeMap;

use sinaloa_report_analytics::ranking::MUNICIPALITY_COLUMN;
use sinaloa_report_analytics::war::{
    MonthlySeries, anomalies, compare, is_significant_increase, municipal_comparisons,
    reconcile_published, window_index,
};
use sinaloa_report_analytics_models::WarComparison;
use sinaloa_report_crime_models::{CrimeType, Period};
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::{ReportContext, war_marker};
use crate::GenerateError;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section, TableCell, TableModel};

const PRE_COLOR: &str = "#3498db";
const POST_COLOR: &str = "#e74c3c";

/// CSS class of a change cell that counts as a significant increase.
pub(crate) const SIGNIFICANT_CLASS: &str = "significant-increase";

/// Municipalities in order of first appearance.
fn municipalities(rows: &[CrimeRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        let name = row.text(MUNICIPALITY_COLUMN);
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

pub(crate) fn comparison_headers(first: &str) -> Vec<String> {
    [
        first,
        "Subtipo",
        "Promedio antes",
        "Promedio después",
        "Cambio (%)",
        "Casos antes",
        "Casos después",
    ]
    .iter()
    .map(|h| (*h).to_string())
    .collect()
}

pub(crate) fn comparison_cells(first: &str, c: &WarComparison) -> Vec<TableCell> {
    let change = TableCell::percent(c.percent_change);
    vec![
        TableCell::text(first),
        TableCell::text(&c.series),
        TableCell::decimal(c.pre_average, 2),
        TableCell::decimal(c.post_average, 2),
        if is_significant_increase(c) {
            change.with_class(SIGNIFICANT_CLASS)
        } else {
            change
        },
        TableCell::count(c.pre_cases),
        TableCell::count(c.post_cases),
    ]
}

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let derived = municipal_views(ctx, section)?;
    state_views(ctx, section)?;

    let published = ctx.data.table(DatasetId::AnomaliesReference);
    if !published.is_empty() && !derived.is_empty() {
        let stale = reconcile_published(published, &derived);
        if !stale.is_empty() {
            let mut table = TableModel::new(
                "war_stale_figures",
                "Cifras publicadas que no coinciden con los datos mensuales",
                ["Municipio", "Subtipo", "Campo", "Publicado", "Calculado"]
                    .iter()
                    .map(|h| (*h).to_string())
                    .collect(),
            )
            .with_source(ctx.data.source_line(DatasetId::AnomaliesReference));
            for figure in &stale {
                table.push_row(
                    vec![
                        TableCell::text(&figure.entity),
                        TableCell::text(&figure.series),
                        TableCell::text(&figure.field),
                        TableCell::decimal(figure.published, 2),
                        TableCell::decimal(figure.derived, 2),
                    ],
                    false,
                );
            }
            section.tables.push(table);
        }
        section.metric("staleFigures", &stale)?;
    }

    Ok(())
}

/// Comparisons of every subtype of every municipality. Returns them for
/// reconciliation.
fn municipal_views(
    ctx: &ReportContext<'_>,
    section: &mut Section,
) -> Result<Vec<WarComparison>, GenerateError> {
    let rows = ctx.data.table(DatasetId::SinaloaMunicipalSubtypes);
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let source = ctx.data.source_line(DatasetId::SinaloaMunicipalSubtypes);

    let mut all = Vec::new();
    let mut flagged: BTreeMap<String, Vec<WarComparison>> = BTreeMap::new();
    for municipality in municipalities(rows) {
        let comparisons = municipal_comparisons(rows, &municipality);
        let municipal_anomalies = anomalies(&comparisons);
        if !municipal_anomalies.is_empty() {
            flagged.insert(municipality, municipal_anomalies);
        }
        all.extend(comparisons);
    }

    let mut table = TableModel::new(
        "war_comparisons",
        "Promedios mensuales antes y después de septiembre de 2024",
        comparison_headers("Municipio"),
    )
    .with_source(&source);
    for c in &all {
        table.push_row(comparison_cells(&c.entity, c), false);
    }
    section.tables.push(table);

    let listed: Vec<&WarComparison> = flagged.values().flatten().collect();
    let mut anomaly_table = TableModel::new(
        "war_anomalies",
        "Subtipos con aumento mayor al 50%",
        comparison_headers("Municipio"),
    )
    .with_source(&source);
    for c in &listed {
        anomaly_table.push_row(comparison_cells(&c.entity, c), true);
    }
    section.tables.push(anomaly_table);

    section.charts.push(
        ChartConfig::new(
            "war_anomalies_chart",
            ChartKind::Bar,
            "Promedio mensual antes y después de septiembre de 2024",
            listed
                .iter()
                .map(|c| format!("{} - {}", c.entity, c.series))
                .collect(),
        )
        .with_y_axis("Casos promedio por mes")
        .with_dataset(ChartDataset::new(
            "Antes",
            listed.iter().map(|c| c.pre_average).collect(),
            PRE_COLOR,
        ))
        .with_dataset(ChartDataset::new(
            "Después",
            listed.iter().map(|c| c.post_average).collect(),
            POST_COLOR,
        )),
    );

    section.metric("anomalies", &flagged)?;
    Ok(all)
}

/// A state column aligned to the report window.
fn state_series(rows: &[CrimeRecord], crime: CrimeType) -> MonthlySeries {
    let mut values = vec![None; Period::report_window().len()];
    for row in rows {
        if let Some(index) = row.period().and_then(window_index) {
            values[index] = Some(row.crime(crime));
        }
    }
    MonthlySeries {
        entity: "Sinaloa".to_string(),
        series: crime.label().to_string(),
        values,
    }
}

fn state_views(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let rows = ctx.data.table(DatasetId::SinaloaMonthly);
    if rows.is_empty() {
        return Ok(());
    }

    let series: Vec<(CrimeType, MonthlySeries)> = [CrimeType::Total, CrimeType::HomicidioDoloso]
        .into_iter()
        .map(|crime| (crime, state_series(rows, crime)))
        .collect();

    let mut chart = ChartConfig::new(
        "war_sinaloa",
        ChartKind::Line,
        "Sinaloa: violencia homicida antes y después de septiembre de 2024",
        Period::report_window().iter().map(ToString::to_string).collect(),
    )
    .with_y_axis("Número de casos");
    chart.markers.push(war_marker());
    for (crime, s) in &series {
        chart = chart.with_dataset(ChartDataset::new(crime.label(), s.dense(), crime.color()));
    }
    section.charts.push(chart);

    let comparisons: Vec<WarComparison> = series.iter().map(|(_, s)| compare(s)).collect();
    let mut table = TableModel::new(
        "war_sinaloa_comparison",
        "Sinaloa: promedios mensuales antes y después de septiembre de 2024",
        comparison_headers("Entidad"),
    )
    .with_source(ctx.data.source_line(DatasetId::SinaloaMonthly));
    for c in &comparisons {
        table.push_row(comparison_cells(&c.entity, c), false);
    }
    section.tables.push(table);

    section.metric("sinaloaComparison", &comparisons)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinaloa_report_source::ReportData;

    use crate::sections::test_support::config;

    const MONTHS: [&str; 10] = [
        "Enero 2024",
        "Febrero 2024",
        "Marzo 2024",
        "Abril 2024",
        "Mayo 2024",
        "Junio 2024",
        "Julio 2024",
        "Agosto 2024",
        "Septiembre 2024",
        "Octubre 2024",
    ];

    fn subtype_rows() -> Vec<CrimeRecord> {
        MONTHS
            .iter()
            .enumerate()
            .map(|(index, period)| {
                let robo = if index < 8 { "10" } else { "30" };
                let fraude = if index < 8 { "10" } else { "11" };
                CrimeRecord::from_pairs(&[
                    ("Municipio", "Culiacán"),
                    ("Periodo", period),
                    ("Robo de vehículo automotor", robo),
                    ("Fraude", fraude),
                ])
            })
            .collect()
    }

    fn data() -> ReportData {
        let mut data = ReportData::default();
        data.insert_table(DatasetId::SinaloaMunicipalSubtypes, subtype_rows());
        data.insert_table(
            DatasetId::SinaloaMonthly,
            MONTHS
                .iter()
                .enumerate()
                .map(|(index, period)| {
                    let total = if index < 8 { "100" } else { "250" };
                    CrimeRecord::from_pairs(&[("Periodo", period), ("Total", total), ("Homicidio doloso", total)])
                })
                .collect(),
        );
        data
    }

    fn built(data: &ReportData) -> Section {
        let config = config();
        let ctx = ReportContext::new(data, &config);
        let mut section = Section::new("war", "Guerra");
        build(&ctx, &mut section).unwrap();
        section
    }

    #[test]
    fn anomalies_list_only_large_increases() {
        let section = built(&data());
        let anomalies = section
            .tables
            .iter()
            .find(|t| t.id == "war_anomalies")
            .unwrap();
        assert_eq!(anomalies.rows.len(), 1);
        assert_eq!(anomalies.rows[0][1].text, "Robo de vehículo automotor");
        assert_eq!(anomalies.rows[0][4].text, "+200.0%");
        assert_eq!(anomalies.rows[0][4].class.as_deref(), Some(SIGNIFICANT_CLASS));

        let all = section
            .tables
            .iter()
            .find(|t| t.id == "war_comparisons")
            .unwrap();
        assert_eq!(all.rows.len(), 2);
        // +10% is not significant
        assert_eq!(all.rows[1][4].class, None);
    }

    #[test]
    fn state_chart_marks_the_break() {
        let section = built(&data());
        let chart = section.charts.iter().find(|c| c.id == "war_sinaloa").unwrap();
        assert_eq!(chart.labels.len(), Period::report_window().len());
        assert_eq!(chart.markers[0].at, "Septiembre 2024");
        // months missing from the dataset are drawn as zero
        assert_eq!(chart.datasets[0].data[18], 0.0);
        assert_eq!(section.metrics["sinaloaComparison"][0]["percentChange"], serde_json::json!(150.0));
    }

    #[test]
    fn published_figures_are_reconciled() {
        let mut data = data();
        data.insert_table(
            DatasetId::AnomaliesReference,
            vec![CrimeRecord::from_pairs(&[
                ("Municipio", "Culiacan"),
                ("Subtipo_delito", "Robo de vehículo automotor"),
                ("Promedio_antes_sept", "10"),
                ("Promedio_despues_sept", "25"),
            ])],
        );
        let section = built(&data);
        let stale = &section.metrics["staleFigures"];
        assert_eq!(stale.as_array().unwrap().len(), 1);
        assert_eq!(stale[0]["field"], "Promedio_despues_sept");
        assert!(section.tables.iter().any(|t| t.id == "war_stale_figures"));
    }
}
