//! Municipality profiles: selected subtype series across the report
//! window, split at September 2024.

use sinaloa_report_analytics::war::{
    MonthlySeries, WAR_BREAK_INDEX, compare, municipal_comparisons, municipal_subtype_series,
};
use sinaloa_report_analytics_models::WarComparison;
use sinaloa_report_crime_models::Period;
use sinaloa_report_source_models::CrimeRecord;

use super::ReportContext;
use super::war::{comparison_cells, comparison_headers};
use super::war_marker;
use crate::GenerateError;
use crate::config::ProfileConfig;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section, TableCell, TableModel, format_count};

/// Series picked when a profile names none.
const DEFAULT_SERIES: usize = 5;

const DEFAULT_PALETTE: [&str; 5] = ["#dc3545", "#fd7e14", "#e83e8c", "#6f42c1", "#20c997"];

const WAR_START_CLASS: &str = "war-start";

/// The series to draw, in display order.
fn select_series(
    rows: &[CrimeRecord],
    profile: &ProfileConfig,
) -> Vec<MonthlySeries> {
    let mut all = municipal_subtype_series(rows, &profile.municipality);

    let names: Vec<String> = if profile.subtypes.is_empty() {
        municipal_comparisons(rows, &profile.municipality)
            .into_iter()
            .take(DEFAULT_SERIES)
            .map(|c| c.series)
            .collect()
    } else {
        profile.subtypes.clone()
    };

    names
        .iter()
        .filter_map(|name| {
            let position = all.iter().position(|s| &s.series == name);
            if position.is_none() {
                log::warn!("{}: no '{name}' column", profile.municipality);
            }
            position.map(|index| all.swap_remove(index))
        })
        .collect()
}

fn color(palette: &[String], index: usize) -> &str {
    if palette.is_empty() {
        DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
    } else {
        &palette[index % palette.len()]
    }
}

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(
    ctx: &ReportContext<'_>,
    profile: &ProfileConfig,
    section: &mut Section,
) -> Result<(), GenerateError> {
    let rows = ctx.data.table(profile.dataset);
    let series = select_series(rows, profile);
    if series.is_empty() {
        log::warn!("No series to show for {}", profile.municipality);
        return Ok(());
    }

    let prefix = section.name.clone();
    let municipality = &profile.municipality;
    let labels: Vec<String> = Period::report_window().iter().map(ToString::to_string).collect();
    let source = ctx.data.source_line(profile.dataset);

    let mut chart = ChartConfig::new(
        &format!("{prefix}_chart"),
        ChartKind::Line,
        format!("{municipality}: delitos seleccionados antes y después de septiembre de 2024"),
        labels.clone(),
    )
    .with_y_axis("Número de casos");
    chart.markers.push(war_marker());
    for (index, s) in series.iter().enumerate() {
        chart = chart.with_dataset(ChartDataset::new(
            &s.series,
            s.dense(),
            color(&profile.palette, index),
        ));
    }
    section.charts.push(chart);

    let mut values = TableModel::new(
        &format!("{prefix}_values"),
        format!("{municipality}: casos por mes"),
        std::iter::once("Mes".to_string())
            .chain(series.iter().map(|s| s.series.clone()))
            .collect(),
    )
    .with_source(&source);
    for (index, label) in labels.iter().enumerate() {
        let cells = std::iter::once(TableCell::text(label))
            .chain(series.iter().map(|s| {
                s.values[index].map_or_else(|| TableCell::text("-"), TableCell::count)
            }))
            .map(|cell| {
                if index == WAR_BREAK_INDEX {
                    cell.with_class(WAR_START_CLASS)
                } else {
                    cell
                }
            })
            .collect();
        values.push_row(cells, false);
    }
    section.tables.push(values);

    let comparisons: Vec<WarComparison> = series.iter().map(compare).collect();
    let mut table = TableModel::new(
        &format!("{prefix}_comparison"),
        format!("{municipality}: promedios antes y después de septiembre de 2024"),
        comparison_headers("Municipio"),
    )
    .with_source(&source);
    for c in &comparisons {
        table.push_row(comparison_cells(municipality, c), false);
    }
    section.tables.push(table);

    section.metric("comparisons", &comparisons)?;
    let totals: Vec<(String, String)> = series
        .iter()
        .map(|s| (s.series.clone(), format_count(s.dense().iter().sum())))
        .collect();
    section.metric("seriesTotals", &totals)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinaloa_report_source::{DatasetId, ReportData};

    use crate::sections::test_support::config;
    use crate::sections::war::SIGNIFICANT_CLASS;

    fn rows() -> Vec<CrimeRecord> {
        ["Agosto 2024", "Septiembre 2024"]
            .iter()
            .enumerate()
            .flat_map(|(index, period)| {
                let robo = if index == 0 { "4" } else { "12" };
                [
                    CrimeRecord::from_pairs(&[
                        ("Municipio", "Elota"),
                        ("Periodo", period),
                        ("Robo de vehículo automotor", robo),
                        ("Homicidio doloso", "3"),
                        ("Abuso sexual", "1"),
                    ]),
                    CrimeRecord::from_pairs(&[
                        ("Municipio", "Culiacán"),
                        ("Periodo", period),
                        ("Robo de vehículo automotor", "100"),
                        ("Homicidio doloso", "50"),
                        ("Abuso sexual", "9"),
                    ]),
                ]
            })
            .collect()
    }

    fn profile(subtypes: &[&str], palette: &[&str]) -> ProfileConfig {
        ProfileConfig {
            municipality: "Elota".to_string(),
            dataset: DatasetId::SinaloaMunicipalSubtypes,
            subtypes: subtypes.iter().map(|s| (*s).to_string()).collect(),
            palette: palette.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn built(profile: &ProfileConfig) -> Section {
        let config = config();
        let mut data = ReportData::default();
        data.insert_table(DatasetId::SinaloaMunicipalSubtypes, rows());
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new(&profile.section_name(), "Perfil");
        build(&ctx, profile, &mut section).unwrap();
        section
    }

    #[test]
    fn configured_series_keep_their_order_and_cycle_the_palette() {
        let section = built(&profile(
            &["Homicidio doloso", "Robo de vehículo automotor", "Secuestro"],
            &["#111111"],
        ));
        let chart = &section.charts[0];
        assert_eq!(chart.id, "profile_elota_chart");
        let labels: Vec<&str> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Homicidio doloso", "Robo de vehículo automotor"]);
        assert_eq!(chart.datasets[1].color, "#111111");
        assert_eq!(chart.markers[0].at, "Septiembre 2024");
    }

    #[test]
    fn values_table_marks_the_break_month() {
        let section = built(&profile(&["Robo de vehículo automotor"], &[]));
        let values = &section.tables[0];
        assert_eq!(values.rows[0][1].text, "-");
        assert_eq!(values.rows[7][1].text, "4");
        assert_eq!(values.rows[8][1].text, "12");
        assert_eq!(values.rows[8][0].class.as_deref(), Some(WAR_START_CLASS));
        assert_eq!(values.rows[7][0].class, None);

        let comparison = &section.tables[1];
        assert_eq!(comparison.rows[0][0].text, "Elota");
        assert_eq!(comparison.rows[0][4].text, "+200.0%");
        assert_eq!(comparison.rows[0][4].class.as_deref(), Some(SIGNIFICANT_CLASS));
    }

    #[test]
    fn empty_subtypes_pick_the_largest_increases() {
        let section = built(&profile(&[], &[]));
        let chart = &section.charts[0];
        assert_eq!(chart.datasets[0].label, "Robo de vehículo automotor");
        assert_eq!(chart.datasets.len(), 3);
        assert_eq!(chart.datasets[0].color, DEFAULT_PALETTE[0]);
    }
}
