//! Sinaloa heatmap: municipality polygons shaded by total homicidal
//! violence, with circles sized by the selected crime across the whole
//! dataset so that periods can be compared.

use serde::Serialize;
use sinaloa_report_analytics::choropleth::{HEATMAP_LADDER, normalization_max, normalize};
use sinaloa_report_analytics::markers::{HEATMAP_MARKERS, positive_extent};
use sinaloa_report_analytics::monthly::{PERIOD_COLUMN, unique_periods};
use sinaloa_report_analytics::ranking::MUNICIPALITY_COLUMN;
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::names_match;
use sinaloa_report_geography_models::regions::municipality_info;
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::ReportContext;
use super::municipal::popup;
use crate::GenerateError;
use crate::view::{MapFeature, MapLayer, MapMarker, Section};

const CIRCLE_COLOR: &str = "#e74c3c";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatmapScale {
    periods: usize,
    max_total: f64,
    crime: CrimeType,
    crime_extent: Option<(f64, f64)>,
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
    let totals: Vec<f64> = rows.iter().map(|row| row.crime(CrimeType::Total)).collect();
    let crime_extent = positive_extent(rows.iter().map(|row| row.crime(crime)));
    let periods = unique_periods(rows);

    for (index, period) in periods.iter().enumerate() {
        let period_rows: Vec<&CrimeRecord> = rows
            .iter()
            .filter(|row| row.text(PERIOD_COLUMN) == period)
            .collect();
        if period_rows.is_empty() {
            continue;
        }

        let displayed: Vec<f64> = period_rows
            .iter()
            .map(|row| row.crime(CrimeType::Total))
            .collect();
        let max = normalization_max(ctx.config.normalization.heatmap, &displayed, &totals);

        let mut layer = MapLayer::new(
            &format!("heatmap_{index}"),
            format!("Mapa de calor de violencia homicida - {period}"),
            Some(period.as_str()),
        );
        for feature in ctx.data.features(DatasetId::SinaloaGeojson) {
            let value = period_rows
                .iter()
                .find(|row| names_match(row.text(MUNICIPALITY_COLUMN), &feature.name))
                .map_or(0.0, |row| row.crime(CrimeType::Total));
            let intensity = normalize(value, max);
            layer.features.push(MapFeature {
                name: feature.name.clone(),
                fill: HEATMAP_LADDER.color(intensity).to_string(),
                value,
                intensity,
                geometry: feature.geometry.clone(),
            });
        }

        if let Some(extent) = crime_extent {
            for row in &period_rows {
                let name = row.text(MUNICIPALITY_COLUMN);
                let Some(info) = municipality_info(name) else {
                    log::debug!("No coordinates for municipality '{name}'");
                    continue;
                };
                let Some(radius) = HEATMAP_MARKERS.radius(row.crime(crime), extent) else {
                    continue;
                };
                layer.markers.push(MapMarker {
                    name: name.to_string(),
                    location: info.location,
                    radius,
                    radius_in_meters: false,
                    color: CIRCLE_COLOR.to_string(),
                    popup: popup(row, period),
                });
            }
        }

        layer.legend = HEATMAP_LADDER.legend();
        section.maps.push(layer);
    }

    section.metric(
        "heatmapScale",
        &HeatmapScale {
            periods: periods.len(),
            max_total: totals.iter().copied().fold(0.0, f64::max),
            crime,
            crime_extent,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sinaloa_report_analytics_models::NormalizationBasis;
    use sinaloa_report_source::ReportData;
    use sinaloa_report_source_models::GeoFeature;

    use crate::sections::test_support::config;

    fn row(municipality: &str, period: &str, doloso: &str, total: &str) -> CrimeRecord {
        CrimeRecord::from_pairs(&[
            ("Municipio", municipality),
            ("Periodo", period),
            ("Homicidio doloso", doloso),
            ("Total", total),
        ])
    }

    fn data() -> ReportData {
        let mut data = ReportData::default();
        data.insert_table(
            DatasetId::SinaloaMunicipal,
            vec![
                row("Culiacán", "Enero 2024", "20", "50"),
                row("Mazatlán", "Enero 2024", "2", "5"),
                row("Culiacán", "Octubre 2024", "102", "100"),
                row("Mazatlán", "Octubre 2024", "0", "0"),
            ],
        );
        data.insert_features(
            DatasetId::SinaloaGeojson,
            ["Culiacán", "Mazatlán"]
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

    #[test]
    fn global_maximum_keeps_earlier_periods_lighter() {
        let mut config = config();
        config.normalization.heatmap = NormalizationBasis::GlobalMax;
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("heatmap", "Mapa de calor");
        build(&ctx, &mut section).unwrap();

        let enero = &section.maps[0];
        assert!((enero.features[0].intensity - 0.5).abs() < 1e-9);
        assert_eq!(enero.features[0].fill, "#E31A1C");
        assert_eq!(enero.features[1].fill, "#FEB24C");

        let octubre = &section.maps[1];
        assert_eq!(octubre.features[0].fill, "#800026");
        assert_eq!(octubre.features[1].fill, "#e8e8e8");
    }

    #[test]
    fn period_maximum_saturates_each_period() {
        let mut config = config();
        config.normalization.heatmap = NormalizationBasis::PeriodMax;
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("heatmap", "Mapa de calor");
        build(&ctx, &mut section).unwrap();
        assert_eq!(section.maps[0].features[0].fill, "#800026");
    }

    #[test]
    fn circles_use_the_dataset_extent() {
        let config = config();
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("heatmap", "Mapa de calor");
        build(&ctx, &mut section).unwrap();

        let enero = &section.maps[0];
        assert_eq!(enero.markers.len(), 2);
        // (20 - 2) / (102 - 2) of the way from 8 to 35
        assert!((enero.markers[0].radius - 12.86).abs() < 1e-9);
        assert_eq!(enero.markers[1].radius, 8.0);
        assert_eq!(section.maps[1].markers.len(), 1);
        assert_eq!(section.maps[1].markers[0].radius, 35.0);
        assert_eq!(section.metrics["heatmapScale"]["maxTotal"], serde_json::json!(100.0));
    }
}
