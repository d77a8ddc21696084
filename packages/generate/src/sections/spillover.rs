//! Spillover into neighboring states.
//!
//! Two views: state-level markers for Sinaloa and its neighbors from the
//! monthly spillover file, and a border map where the municipalities of
//! the neighboring states that touch Sinaloa are drawn next to Sinaloa's
//! own municipalities.

use std::collections::BTreeMap;
use std::str::FromStr as _;

use sinaloa_report_analytics::choropleth::{
    SPILLOVER_LADDER, border_absolute_color, normalization_max, normalize,
    sinaloa_absolute_color, sinaloa_absolute_legend,
};
use sinaloa_report_analytics::markers::border_marker_radius;
use sinaloa_report_analytics::metrics::max_or_zero;
use sinaloa_report_analytics::monthly::{PERIOD_COLUMN, unique_periods};
use sinaloa_report_analytics::ranking::MUNICIPALITY_COLUMN;
use sinaloa_report_analytics::spillover::{
    ENTITY_COLUMN, border_changes, border_period_values, border_rows, spillover_points,
};
use sinaloa_report_analytics_models::{SpilloverPoint, ValueView};
use sinaloa_report_crime_models::{CrimeType, Period};
use sinaloa_report_geography_models::names_match;
use sinaloa_report_geography_models::spillover::{NeighborState, border_municipality_location};
use sinaloa_report_geography_models::LatLng;
use sinaloa_report_source::DatasetId;
use sinaloa_report_source_models::CrimeRecord;

use super::{ReportContext, change_class, find_feature};
use crate::GenerateError;
use crate::view::{
    MapFeature, MapLayer, MapMarker, Section, TableCell, TableModel, format_count, format_percent,
};

const NON_BORDER_FILL: &str = "#f0f0f0";
const BORDER_CIRCLE_COLOR: &str = "#e74c3c";

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    state_views(ctx, section)?;
    border_tables(ctx, section)?;
    border_maps(ctx, section);
    Ok(())
}

fn view_name(view: ValueView) -> &'static str {
    match view {
        ValueView::Absolute => "absolute",
        ValueView::Variation => "variation",
    }
}

/// Markers and tables of Sinaloa and its neighbors for every month of the
/// report window.
fn state_views(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = &ctx.data.spillover;
    if data.is_empty() {
        return Ok(());
    }
    let crime = ctx.config.report.crime;
    let window = Period::report_window();
    let labels: Vec<String> = window.iter().map(ToString::to_string).collect();

    let mut points: BTreeMap<&str, Vec<Vec<SpilloverPoint>>> = BTreeMap::new();
    for view in [ValueView::Absolute, ValueView::Variation] {
        let per_period: Vec<Vec<SpilloverPoint>> = window
            .iter()
            .map(|&period| spillover_points(data, period, crime, view))
            .collect();

        for (index, (label, period_points)) in labels.iter().zip(&per_period).enumerate() {
            let mut layer = MapLayer::new(
                &format!("spillover_{}_{index}", view_name(view)),
                format!("{} en Sinaloa y estados vecinos - {label}", crime.label()),
                Some(label.as_str()),
            );
            layer.markers = period_points
                .iter()
                .filter_map(|point| state_marker(point, label))
                .collect();
            section.maps.push(layer);
        }
        points.insert(view_name(view), per_period);
    }

    let source = ctx.data.source_line(DatasetId::Spillover);
    let absolute = &points[view_name(ValueView::Absolute)];
    let mut values = TableModel::new(
        "spillover_states",
        format!("{} por estado", crime.label()),
        std::iter::once("Estado".to_string())
            .chain(labels.iter().cloned())
            .collect(),
    )
    .with_source(&source);
    let mut variations = TableModel::new(
        "spillover_variation",
        format!("Variación de {} por estado", crime.label()),
        values.headers.clone(),
    )
    .with_source(&source);

    for (row, state) in NeighborState::all().iter().enumerate() {
        let name = state.as_ref();
        let highlighted = !state.is_neighbor();
        values.push_row(
            std::iter::once(TableCell::text(name))
                .chain(absolute.iter().map(|period| {
                    let point = &period[row];
                    TableCell::count(point.value).with_class(&point.intensity_class)
                }))
                .collect(),
            highlighted,
        );
        variations.push_row(
            std::iter::once(TableCell::text(name))
                .chain(absolute.iter().map(|period| {
                    let change = period[row].variation;
                    TableCell::percent(change).with_class(change_class(change))
                }))
                .collect(),
            highlighted,
        );
    }
    section.tables.push(values);
    section.tables.push(variations);

    section.metric("spilloverPoints", &points)?;
    Ok(())
}

fn state_marker(point: &SpilloverPoint, period: &str) -> Option<MapMarker> {
    let state = NeighborState::from_str(&point.state).ok()?;
    let popup = BTreeMap::from([
        ("Estado".to_string(), point.state.clone()),
        ("Periodo".to_string(), period.to_string()),
        ("Casos".to_string(), format_count(point.value)),
        ("Variación".to_string(), format_percent(point.variation)),
    ]);
    Some(MapMarker {
        name: point.state.clone(),
        location: state.marker_location(),
        // sizes are diameters
        radius: point.size / 2.0,
        radius_in_meters: false,
        color: point.color.clone(),
        popup,
    })
}

/// Absolute values and month-over-month changes of the border
/// municipalities.
fn border_tables(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let rows = ctx.data.table(DatasetId::BorderMunicipal);
    if rows.is_empty() {
        return Ok(());
    }
    let crime = ctx.config.report.crime;
    let source = ctx.data.source_line(DatasetId::BorderMunicipal);
    let periods = unique_periods(rows);

    let absolute = border_rows(rows, &periods, crime);
    let mut table = TableModel::new(
        "border_absolute",
        format!("Valores absolutos por municipio fronterizo - {}", crime.label()),
        ["Municipio", "Estado"]
            .iter()
            .map(|h| (*h).to_string())
            .chain(periods.iter().cloned())
            .chain(std::iter::once("Total".to_string()))
            .collect(),
    )
    .with_source(&source);
    for row in &absolute {
        let cells = [TableCell::text(&row.municipality), TableCell::text(&row.state)]
            .into_iter()
            .chain(row.values.iter().zip(&row.cell_classes).map(|(value, class)| {
                let cell = TableCell::count(*value);
                match class {
                    Some(class) => cell.with_class(class),
                    None => cell,
                }
            }))
            .chain(std::iter::once(TableCell::count(row.total)))
            .collect();
        table.push_row(cells, row.highlighted);
    }
    section.tables.push(table);

    let changes = border_changes(rows, &periods);
    let mut changes_table = TableModel::new(
        "border_changes",
        "Cambios porcentuales mes a mes",
        std::iter::once("Municipio".to_string())
            .chain(periods.iter().skip(1).cloned())
            .collect(),
    )
    .with_source(&source);
    for row in &changes {
        changes_table.push_row(
            std::iter::once(TableCell::text(&row.label))
                .chain(row.changes.iter().map(|c| {
                    TableCell::percent(c.value).with_class(change_class(c.value))
                }))
                .collect(),
            false,
        );
    }
    section.tables.push(changes_table);

    section.metric("borderMunicipalities", &absolute)?;
    section.metric("borderChanges", &changes)?;
    Ok(())
}

/// One map per border-data period.
fn border_maps(ctx: &ReportContext<'_>, section: &mut Section) {
    let border = ctx.data.table(DatasetId::BorderMunicipal);
    let sinaloa = ctx.data.table(DatasetId::SinaloaMunicipal);
    let periods = if border.is_empty() {
        unique_periods(sinaloa)
    } else {
        unique_periods(border)
    };
    let sinaloa_totals: Vec<f64> = sinaloa.iter().map(|row| row.crime(CrimeType::Total)).collect();

    for (index, period) in periods.iter().enumerate() {
        let mut layer = MapLayer::new(
            &format!("spillover_border_{index}"),
            format!("Sinaloa y municipios fronterizos - {period}"),
            Some(period.as_str()),
        );
        layer.features = sinaloa_features(ctx, sinaloa, period, &sinaloa_totals);
        layer.features.extend(neighbor_features(ctx, border, period));
        layer.markers = border_markers(ctx, border, period);
        layer.legend = if ctx.config.report.spillover_absolute {
            sinaloa_absolute_legend()
        } else {
            SPILLOVER_LADDER.legend()
        };
        section.maps.push(layer);
    }
}

fn period_value(rows: &[CrimeRecord], period: &str, name: &str, crime: CrimeType) -> f64 {
    rows.iter()
        .find(|row| {
            row.text(PERIOD_COLUMN) == period && names_match(row.text(MUNICIPALITY_COLUMN), name)
        })
        .map_or(0.0, |row| row.crime(crime))
}

/// Sinaloa's municipalities shaded by total homicidal violence, either
/// normalized (the maximum is at least 1) or by absolute count.
fn sinaloa_features(
    ctx: &ReportContext<'_>,
    rows: &[CrimeRecord],
    period: &str,
    all_totals: &[f64],
) -> Vec<MapFeature> {
    let displayed: Vec<f64> = rows
        .iter()
        .filter(|row| row.text(PERIOD_COLUMN) == period)
        .map(|row| row.crime(CrimeType::Total))
        .collect();
    let max = normalization_max(ctx.config.normalization.spillover, &displayed, all_totals).max(1.0);

    ctx.data
        .features(DatasetId::SinaloaGeojson)
        .iter()
        .map(|feature| {
            let value = period_value(rows, period, &feature.name, CrimeType::Total);
            let intensity = normalize(value, max);
            let fill = if ctx.config.report.spillover_absolute {
                sinaloa_absolute_color(value)
            } else {
                SPILLOVER_LADDER.color(intensity)
            };
            MapFeature {
                name: feature.name.clone(),
                fill: fill.to_string(),
                value,
                intensity,
                geometry: feature.geometry.clone(),
            }
        })
        .collect()
}

/// Municipalities of the neighboring states. Border municipalities are
/// colored by their absolute count, the rest are drawn flat.
fn neighbor_features(ctx: &ReportContext<'_>, rows: &[CrimeRecord], period: &str) -> Vec<MapFeature> {
    let crime = ctx.config.report.crime;
    let mut features = Vec::new();
    for state in NeighborState::all().iter().filter(|s| s.is_neighbor()) {
        let state_rows: Vec<CrimeRecord> = rows
            .iter()
            .filter(|row| names_match(row.text(ENTITY_COLUMN), state.as_ref()))
            .cloned()
            .collect();
        for feature in ctx.data.features(DatasetId::geojson_for(*state)) {
            let is_border = ctx.data.border_index.contains(state.as_ref(), &feature.name);
            let value = if is_border {
                period_value(&state_rows, period, &feature.name, crime)
            } else {
                0.0
            };
            features.push(MapFeature {
                name: feature.name.clone(),
                fill: if is_border {
                    border_absolute_color(value).to_string()
                } else {
                    NON_BORDER_FILL.to_string()
                },
                value,
                intensity: 0.0,
                geometry: feature.geometry.clone(),
            });
        }
    }
    features
}

fn border_location(ctx: &ReportContext<'_>, municipality: &str, state: &str) -> Option<LatLng> {
    NeighborState::from_str(state)
        .ok()
        .and_then(|state| find_feature(ctx.data.features(DatasetId::geojson_for(state)), municipality))
        .and_then(|feature| feature.center)
        .or_else(|| border_municipality_location(municipality))
}

fn border_markers(ctx: &ReportContext<'_>, rows: &[CrimeRecord], period: &str) -> Vec<MapMarker> {
    let crime = ctx.config.report.crime;
    let values = border_period_values(rows, period, crime);
    let max = max_or_zero(values.iter().map(|(_, _, value)| *value));

    values
        .into_iter()
        .filter_map(|(municipality, state, value)| {
            let Some(location) = border_location(ctx, &municipality, &state) else {
                log::warn!("No coordinates for border municipality {municipality}, {state}");
                return None;
            };
            let popup = BTreeMap::from([
                ("Estado".to_string(), state.clone()),
                ("Periodo".to_string(), period.to_string()),
                (crime.label().to_string(), format_count(value)),
            ]);
            Some(MapMarker {
                name: municipality,
                location,
                radius: border_marker_radius(value, max),
                radius_in_meters: false,
                color: BORDER_CIRCLE_COLOR.to_string(),
                popup,
            })
        })
        .collect()
}
