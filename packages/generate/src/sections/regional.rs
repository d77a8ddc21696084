//! Sinaloa's four regions: totals over time, per-period rankings and a
//! map where each municipality keeps its region's hue, darkened by its
//! share of the highest municipal value in the dataset.

use std::collections::BTreeMap;

use sinaloa_report_analytics::choropleth::{adjust_color_intensity, normalize};
use sinaloa_report_analytics::markers::{REGIONAL_MARKERS, positive_extent};
use sinaloa_report_analytics::metrics::max_or_zero;
use sinaloa_report_analytics::monthly::{PERIOD_COLUMN, unique_periods};
use sinaloa_report_analytics::ranking::MUNICIPALITY_COLUMN;
use sinaloa_report_analytics::regional::{regional_ranking, regional_table};
use sinaloa_report_analytics_models::{LegendEntry, RegionalTotal};
use sinaloa_report_geography_models::regions::{municipality_info, region_name, region_polygon_color};
use sinaloa_report_geography_models::{Region, names_match};
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::ReportContext;
use super::municipal::popup;
use crate::GenerateError;
use crate::view::{
    ChartConfig, ChartDataset, ChartKind, MapFeature, MapLayer, MapMarker, Section, TableCell,
    TableModel, format_count,
};

/// Members listed next to each region in the ranking tables.
const LISTED_MEMBERS: usize = 3;

fn region_legend() -> Vec<LegendEntry> {
    Region::all()
        .iter()
        .map(|region| LegendEntry {
            label: region.name().to_string(),
            color: region.polygon_color().to_string(),
        })
        .collect()
}

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let rows = ctx.data.table(DatasetId::SinaloaMunicipal);
    if rows.is_empty() {
        return Ok(());
    }
    let crime = ctx.config.report.crime;
    let source = ctx.data.source_line(DatasetId::SinaloaMunicipal);
    let periods = unique_periods(rows);

    let trend = regional_table(rows, &periods, crime);
    let mut chart = ChartConfig::new(
        "regional_trend",
        ChartKind::Line,
        format!("{} por región", crime.label()),
        periods.clone(),
    )
    .with_y_axis("Número de casos");
    let mut table = TableModel::new(
        "regional_table",
        format!("{} por región y periodo", crime.label()),
        std::iter::once("Región".to_string())
            .chain(periods.iter().cloned())
            .chain(std::iter::once("Total".to_string()))
            .collect(),
    )
    .with_source(&source);
    for (row, region) in trend.iter().zip(Region::all()) {
        chart = chart.with_dataset(ChartDataset::new(
            &row.region,
            row.values.clone(),
            region.polygon_color(),
        ));
        table.push_row(
            std::iter::once(TableCell::text(&row.region))
                .chain(row.values.iter().map(|v| TableCell::count(*v)))
                .chain(std::iter::once(TableCell::count(row.total)))
                .collect(),
            false,
        );
    }
    section.charts.push(chart);
    section.tables.push(table);

    let values: Vec<f64> = rows.iter().map(|row| row.crime(crime)).collect();
    let global_max = max_or_zero(values.iter().copied());
    let extent = positive_extent(values.iter().copied());

    let mut rankings = BTreeMap::new();
    for (index, period) in periods.iter().enumerate() {
        let ranking = regional_ranking(rows, period, crime);
        section
            .tables
            .push(ranking_table(index, period, &ranking, &source));

        let period_rows: Vec<&CrimeRecord> = rows
            .iter()
            .filter(|row| row.text(PERIOD_COLUMN) == period)
            .collect();
        let mut layer = MapLayer::new(
            &format!("regional_map_{index}"),
            format!("Regiones de Sinaloa - {period}"),
            Some(period.as_str()),
        );
        layer.features = region_features(ctx, &period_rows, global_max);
        if let Some(extent) = extent {
            layer.markers = region_markers(&period_rows, period, ctx, extent);
        }
        layer.legend = region_legend();
        section.maps.push(layer);

        rankings.insert(period.clone(), ranking);
    }

    section.metric("regionalTrend", &trend)?;
    section.metric("regionalRankings", &rankings)?;
    Ok(())
}

fn ranking_table(index: usize, period: &str, ranking: &[RegionalTotal], source: &str) -> TableModel {
    let mut table = TableModel::new(
        &format!("regional_ranking_{index}"),
        format!("Ranking regional - {period}"),
        vec![
            "#".to_string(),
            "Región".to_string(),
            "Total".to_string(),
            "Municipios principales".to_string(),
        ],
    )
    .with_source(source);
    for (rank, total) in ranking.iter().enumerate() {
        let members = total
            .members
            .iter()
            .take(LISTED_MEMBERS)
            .map(|m| format!("{} ({})", m.municipality, format_count(m.value)))
            .collect::<Vec<_>>()
            .join(", ");
        table.push_row(
            vec![
                TableCell::text((rank + 1).to_string()),
                TableCell::text(&total.region),
                TableCell::count(total.total),
                TableCell::text(members),
            ],
            rank == 0,
        );
    }
    table
}

fn region_features(
    ctx: &ReportContext<'_>,
    period_rows: &[&CrimeRecord],
    global_max: f64,
) -> Vec<MapFeature> {
    let crime = ctx.config.report.crime;
    ctx.data
        .features(DatasetId::SinaloaGeojson)
        .iter()
        .map(|feature| {
            let value = period_rows
                .iter()
                .find(|row| names_match(row.text(MUNICIPALITY_COLUMN), &feature.name))
                .map_or(0.0, |row| row.crime(crime));
            let base = region_polygon_color(&feature.name);
            let intensity = normalize(value, global_max);
            MapFeature {
                name: feature.name.clone(),
                fill: if value > 0.0 {
                    adjust_color_intensity(base, intensity)
                } else {
                    base.to_string()
                },
                value,
                intensity,
                geometry: feature.geometry.clone(),
            }
        })
        .collect()
}

fn region_markers(
    period_rows: &[&CrimeRecord],
    period: &str,
    ctx: &ReportContext<'_>,
    extent: (f64, f64),
) -> Vec<MapMarker> {
    let crime = ctx.config.report.crime;
    period_rows
        .iter()
        .filter_map(|row| {
            let name = row.text(MUNICIPALITY_COLUMN);
            let info = municipality_info(name)?;
            let radius = REGIONAL_MARKERS.radius(row.crime(crime), extent)?;
            let mut popup = popup(row, period);
            popup.insert("Región".to_string(), region_name(name).to_string());
            Some(MapMarker {
                name: name.to_string(),
                location: info.location,
                radius,
                radius_in_meters: false,
                color: info.region.circle_color().to_string(),
                popup,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinaloa_report_source::ReportData;
    use sinaloa_report_source_models::GeoFeature;

    use crate::sections::test_support::config;

    fn row(municipality: &str, period: &str, doloso: &str) -> CrimeRecord {
        CrimeRecord::from_pairs(&[
            ("Municipio", municipality),
            ("Periodo", period),
            ("Homicidio doloso", doloso),
            ("Total", doloso),
        ])
    }

    fn data() -> ReportData {
        let mut data = ReportData::default();
        data.insert_table(
            DatasetId::SinaloaMunicipal,
            vec![
                row("Culiacán", "Enero 2024", "80"),
                row("Navolato", "Enero 2024", "20"),
                row("Mazatlán", "Enero 2024", "10"),
                row("Culiacán", "Febrero 2024", "40"),
            ],
        );
        data.insert_features(
            DatasetId::SinaloaGeojson,
            ["Culiacán", "Ahome"]
                .iter()
                .map(|name| GeoFeature {
                    name: (*name).to_string(),
                    center: None,
                    geometry: None,
                })
                .collect(),
        );
        data
    }

    fn built() -> Section {
        let config = config();
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("regional", "Regiones");
        build(&ctx, &mut section).unwrap();
        section
    }

    #[test]
    fn trend_sums_regions_per_period() {
        let section = built();
        let table = section
            .tables
            .iter()
            .find(|t| t.id == "regional_table")
            .unwrap();
        assert_eq!(table.headers, vec!["Región", "Enero 2024", "Febrero 2024", "Total"]);
        let centro = table.rows.iter().find(|r| r[0].text == "Centro").unwrap();
        assert_eq!(centro[1].text, "100");
        assert_eq!(centro[2].text, "40");
        assert_eq!(centro[3].text, "140");
    }

    #[test]
    fn ranking_lists_leading_members() {
        let section = built();
        let enero = section
            .tables
            .iter()
            .find(|t| t.id == "regional_ranking_0")
            .unwrap();
        assert_eq!(enero.rows[0][1].text, "Centro");
        assert_eq!(enero.rows[0][3].text, "Culiacán (80), Navolato (20)");
        assert_eq!(enero.rows[1][1].text, "Sur");
        assert_eq!(enero.highlighted_rows, vec![0]);
    }

    #[test]
    fn map_darkens_region_colors_against_the_global_maximum() {
        let section = built();
        let enero = &section.maps[0];
        assert_eq!(enero.features[0].fill, "rgb(46, 204, 113)");
        // no data keeps the plain region color
        assert_eq!(enero.features[1].fill, "#e74c3c");

        let febrero = &section.maps[1];
        assert!((febrero.features[0].intensity - 0.5).abs() < 1e-9);

        assert_eq!(enero.markers.len(), 3);
        assert_eq!(enero.markers[0].radius, 12.0);
        assert_eq!(enero.markers[0].color, "#27ae60");
        assert_eq!(enero.markers[2].radius, 3.0);
        assert_eq!(enero.markers[0].popup["Región"], "Centro");
        assert_eq!(enero.legend.len(), 4);
    }
}
