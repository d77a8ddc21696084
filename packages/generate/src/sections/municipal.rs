//! Municipal snapshots of Sinaloa: one table and three map layers per
//! period (polygon choropleth, proportional markers and the snapshot
//! halos).

use std::collections::BTreeMap;

use sinaloa_report_analytics::choropleth::{
    MUNICIPAL_LADDER, PERIOD_LADDER, SNAPSHOT_LADDER, normalization_max, normalize,
};
use sinaloa_report_analytics::markers::{
    MUNICIPAL_MARKERS, positive_extent, snapshot_halo_meters, snapshot_point_radius,
};
use sinaloa_report_analytics::metrics::max_or_zero;
use sinaloa_report_analytics::monthly::{PERIOD_COLUMN, unique_periods};
use sinaloa_report_analytics::ranking::{MUNICIPALITY_COLUMN, municipal_snapshot};
use sinaloa_report_analytics_models::MunicipalSnapshot;
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::regions::municipality_info;
use sinaloa_report_geography_models::names_match;
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::{ReportContext, crime_headers};
use crate::GenerateError;
use crate::view::{MapFeature, MapLayer, MapMarker, Section, TableCell, TableModel, format_count};

const POINT_COLOR: &str = "#e74c3c";

/// Popup lines for one municipality row.
pub(crate) fn popup(row: &CrimeRecord, period: &str) -> BTreeMap<String, String> {
    std::iter::once(("Periodo".to_string(), period.to_string()))
        .chain(
            CrimeType::all()
                .iter()
                .map(|c| (c.label().to_string(), format_count(row.crime(*c)))),
        )
        .collect()
}

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let rows = ctx.data.table(DatasetId::SinaloaMunicipal);
    let crime = ctx.config.report.crime;
    let source = ctx.data.source_line(DatasetId::SinaloaMunicipal);

    let all_values: Vec<f64> = rows.iter().map(|row| row.crime(crime)).collect();
    let mut snapshots = Vec::new();

    for (index, period) in unique_periods(rows).iter().enumerate() {
        let period_rows: Vec<&CrimeRecord> = rows
            .iter()
            .filter(|row| row.text(PERIOD_COLUMN) == period)
            .collect();

        let snapshot = municipal_snapshot(rows, period, crime);
        section
            .tables
            .push(snapshot_table(index, &snapshot, &source));
        section.maps.push(choropleth_layer(ctx, index, period, &period_rows, &all_values));
        section.maps.push(marker_layer(ctx, index, period, &period_rows, &all_values));
        section.maps.push(snapshot_layer(index, period, &period_rows, crime));
        snapshots.push(snapshot);
    }

    let stats: BTreeMap<&str, _> = snapshots
        .iter()
        .map(|s| (s.period.as_str(), &s.stats))
        .collect();
    section.metric("snapshotStats", &stats)?;
    Ok(())
}

fn snapshot_table(index: usize, snapshot: &MunicipalSnapshot, source: &str) -> TableModel {
    let mut table = TableModel::new(
        &format!("municipal_{index}"),
        format!("Municipios de Sinaloa - {}", snapshot.period),
        crime_headers(&["#", "Municipio"]),
    )
    .with_source(format!(
        "{source} Datos municipales de Sinaloa para {}.",
        snapshot.period
    ));
    for row in &snapshot.rows {
        let cells = [
            TableCell::text(row.rank.to_string()),
            TableCell::text(&row.municipality),
        ]
        .into_iter()
        .chain(CrimeType::all().iter().map(|c| {
            TableCell::count(row.values.get(c).copied().unwrap_or(0.0))
        }))
        .collect();
        table.push_row(cells, row.highlighted);
    }
    table
}

fn choropleth_layer(
    ctx: &ReportContext<'_>,
    index: usize,
    period: &str,
    period_rows: &[&CrimeRecord],
    all_values: &[f64],
) -> MapLayer {
    let crime = ctx.config.report.crime;
    let displayed: Vec<f64> = period_rows.iter().map(|row| row.crime(crime)).collect();
    let max = normalization_max(ctx.config.normalization.choropleth, &displayed, all_values);

    let mut layer = MapLayer::new(
        &format!("municipal_choropleth_{index}"),
        format!("{} por municipio - {period}", crime.label()),
        Some(period),
    );
    for feature in ctx.data.features(DatasetId::SinaloaGeojson) {
        let value = period_rows
            .iter()
            .find(|row| names_match(row.text(MUNICIPALITY_COLUMN), &feature.name))
            .map_or(0.0, |row| row.crime(crime));
        let intensity = normalize(value, max);
        layer.features.push(MapFeature {
            name: feature.name.clone(),
            fill: PERIOD_LADDER.color(intensity).to_string(),
            value,
            intensity,
            geometry: feature.geometry.clone(),
        });
    }
    layer.legend = PERIOD_LADDER.legend();
    layer
}

fn marker_layer(
    ctx: &ReportContext<'_>,
    index: usize,
    period: &str,
    period_rows: &[&CrimeRecord],
    all_values: &[f64],
) -> MapLayer {
    let crime = ctx.config.report.crime;
    let displayed: Vec<f64> = period_rows.iter().map(|row| row.crime(crime)).collect();
    let max = normalization_max(ctx.config.normalization.municipal, &displayed, all_values);

    let mut layer = MapLayer::new(
        &format!("municipal_markers_{index}"),
        format!("{} - {period}", crime.label()),
        Some(period),
    );
    let Some(extent) = positive_extent(displayed.iter().copied()) else {
        return layer;
    };

    for row in period_rows {
        let name = row.text(MUNICIPALITY_COLUMN);
        let value = row.crime(crime);
        let (Some(info), Some(radius)) = (municipality_info(name), MUNICIPAL_MARKERS.radius(value, extent))
        else {
            continue;
        };
        layer.markers.push(MapMarker {
            name: name.to_string(),
            location: info.location,
            radius,
            radius_in_meters: false,
            color: MUNICIPAL_LADDER.color_for(value, max).to_string(),
            popup: popup(row, period),
        });
    }
    layer.legend = MUNICIPAL_LADDER.legend();
    layer
}

/// Halo colored by total violence plus a point sized by the selected
/// crime, per municipality.
fn snapshot_layer(index: usize, period: &str, period_rows: &[&CrimeRecord], crime: CrimeType) -> MapLayer {
    let max_total = max_or_zero(period_rows.iter().map(|row| row.crime(CrimeType::Total)));
    let max_crime = max_or_zero(period_rows.iter().map(|row| row.crime(crime)));

    let mut layer = MapLayer::new(
        &format!("municipal_snapshot_{index}"),
        format!("Violencia homicida total y {} - {period}", crime.label()),
        Some(period),
    );
    for row in period_rows {
        let name = row.text(MUNICIPALITY_COLUMN);
        let Some(info) = municipality_info(name) else {
            log::debug!("No coordinates for municipality '{name}'");
            continue;
        };
        let total = row.crime(CrimeType::Total);
        layer.markers.push(MapMarker {
            name: name.to_string(),
            location: info.location,
            radius: snapshot_halo_meters(total),
            radius_in_meters: true,
            color: SNAPSHOT_LADDER.color_for(total, max_total).to_string(),
            popup: popup(row, period),
        });
        layer.markers.push(MapMarker {
            name: name.to_string(),
            location: info.location,
            radius: snapshot_point_radius(row.crime(crime), max_crime),
            radius_in_meters: false,
            color: POINT_COLOR.to_string(),
            popup: popup(row, period),
        });
    }
    layer.legend = SNAPSHOT_LADDER.legend();
    layer
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
                row("Culiacán", "Enero 2024", "50", "60"),
                row("Navolato", "Enero 2024", "10", "12"),
                row("Elota", "Enero 2024", "0", "0"),
                row("Culiacán", "Febrero 2024", "100", "110"),
                row("Navolato", "Febrero 2024", "25", "30"),
                row("Elota", "Febrero 2024", "0", "1"),
            ],
        );
        data.insert_features(
            DatasetId::SinaloaGeojson,
            ["CULIACAN", "Navolato", "Elota"]
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

    fn layer<'a>(section: &'a Section, id: &str) -> &'a MapLayer {
        section.maps.iter().find(|m| m.id == id).unwrap()
    }

    #[test]
    fn choropleth_matches_features_ignoring_accents() {
        let config = config();
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("municipal", "Municipios");
        build(&ctx, &mut section).unwrap();

        let enero = layer(&section, "municipal_choropleth_0");
        assert_eq!(enero.features[0].value, 50.0);
        assert_eq!(enero.features[0].fill, "#800026");
        // 10 / 50 sits exactly on the lowest threshold
        assert_eq!(enero.features[1].fill, "#FC4E2A");
        assert_eq!(enero.features[2].fill, "#cccccc");
    }

    #[test]
    fn global_basis_dims_earlier_periods() {
        let mut config = config();
        config.normalization.choropleth = NormalizationBasis::GlobalMax;
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("municipal", "Municipios");
        build(&ctx, &mut section).unwrap();

        let enero = layer(&section, "municipal_choropleth_0");
        assert!((enero.features[0].intensity - 0.5).abs() < 1e-9);
        assert_eq!(enero.features[0].fill, "#E31A1C");
    }

    #[test]
    fn markers_skip_zero_values_and_halos_use_meters() {
        let config = config();
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("municipal", "Municipios");
        build(&ctx, &mut section).unwrap();

        let markers = layer(&section, "municipal_markers_0");
        assert_eq!(markers.markers.len(), 2);
        assert_eq!(markers.markers[0].radius, 30.0);
        assert_eq!(markers.markers[1].radius, 8.0);
        assert_eq!(markers.markers[0].color, "#8B0000");

        let snapshot = layer(&section, "municipal_snapshot_0");
        // halo and point for each of the three municipalities
        assert_eq!(snapshot.markers.len(), 6);
        assert!(snapshot.markers[0].radius_in_meters);
        assert_eq!(snapshot.markers[0].radius, 6000.0);
        assert_eq!(snapshot.markers[1].radius, 20.0);
        assert_eq!(snapshot.markers[0].popup["Periodo"], "Enero 2024");
    }

    #[test]
    fn snapshot_tables_rank_by_total() {
        let config = config();
        let data = data();
        let ctx = ReportContext::new(&data, &config);
        let mut section = Section::new("municipal", "Municipios");
        build(&ctx, &mut section).unwrap();

        assert_eq!(section.tables.len(), 2);
        let febrero = &section.tables[1];
        assert_eq!(febrero.rows[0][1].text, "Culiacán");
        assert_eq!(febrero.highlighted_rows, vec![0, 1, 2]);
        assert_eq!(
            section.metrics["snapshotStats"]["Febrero 2024"]["affected"],
            serde_json::json!(2)
        );
    }
}
