//! Cross-border spillover: Sinaloa against its neighboring states and the
//! neighboring municipalities along its border.

use sinaloa_report_analytics_models::{
    BorderMunicipalityRow, ChangeRow, PeriodValue, SpilloverPoint, ValueView,
};
use sinaloa_report_crime_models::{CrimeType, Month, Period};
use sinaloa_report_geography_models::spillover::NeighborState;
use sinaloa_report_source_models::{CrimeRecord, SpilloverData};

use crate::metrics::{max_or_zero, percent_change};
use crate::monthly::PERIOD_COLUMN;
use crate::ranking::MUNICIPALITY_COLUMN;

/// Column holding the state of a border municipality.
pub const ENTITY_COLUMN: &str = "Entidad";

/// Border rows with a total above this are highlighted.
pub const BORDER_HIGHLIGHT_TOTAL: f64 = 20.0;

/// Change reported when a border municipality goes from zero to some cases.
pub const NEW_CASE_CHANGE: f64 = 100.0;

const MARKER_COLORS: [&str; 5] = ["#8e44ad", "#e74c3c", "#e67e22", "#f39c12", "#27ae60"];
const INTENSITY_CLASSES: [&str; 5] = [
    "intensidad-muy-alta",
    "intensidad-alta",
    "intensidad-media",
    "intensidad-baja",
    "intensidad-muy-baja",
];
const RATIO_THRESHOLDS: [f64; 4] = [0.8, 0.6, 0.4, 0.2];
const VARIATION_THRESHOLDS: [f64; 4] = [50.0, 20.0, 0.0, -20.0];

fn bucket(value: f64, thresholds: &[f64; 4]) -> usize {
    thresholds
        .iter()
        .position(|t| value > *t)
        .unwrap_or(thresholds.len())
}

/// The period a spillover value is compared with: the same month of 2024
/// for 2025, the previous month otherwise. `Enero` of a non-2025 year has
/// no comparison.
#[must_use]
pub fn comparison_period(period: Period) -> Option<Period> {
    match period {
        Period::Month { year: 2025, .. } => Some(period.year_before()),
        Period::Month {
            month: Month::Enero,
            ..
        }
        | Period::Year(_) => None,
        Period::Month { .. } => Some(period.previous()),
    }
}

/// Percent change of a state's value against its comparison period.
#[must_use]
pub fn variation(data: &SpilloverData, state: &str, period: Period, crime: CrimeType) -> f64 {
    let current = data.period_value(state, period, crime);
    comparison_period(period).map_or(0.0, |prior| {
        percent_change(current, data.period_value(state, prior, crime))
    })
}

/// Marker diameter: 30 pixels plus up to 50 in proportion to `max`.
#[must_use]
pub fn marker_size(value: f64, max: f64) -> f64 {
    let ratio = if max > 0.0 { value / max } else { 0.0 };
    50.0f64.mul_add(ratio, 30.0)
}

/// Marker color by share of the maximum.
#[must_use]
pub fn ratio_color(ratio: f64) -> &'static str {
    MARKER_COLORS[bucket(ratio, &RATIO_THRESHOLDS)]
}

/// Marker color by percent change.
#[must_use]
pub fn variation_color(variation: f64) -> &'static str {
    MARKER_COLORS[bucket(variation, &VARIATION_THRESHOLDS)]
}

/// CSS intensity class by share of the maximum.
#[must_use]
pub fn ratio_intensity_class(ratio: f64) -> &'static str {
    INTENSITY_CLASSES[bucket(ratio, &RATIO_THRESHOLDS)]
}

/// CSS intensity class by percent change.
#[must_use]
pub fn variation_intensity_class(variation: f64) -> &'static str {
    INTENSITY_CLASSES[bucket(variation, &VARIATION_THRESHOLDS)]
}

/// One marker per state (Sinaloa and its neighbors) for `period`.
///
/// In [`ValueView::Variation`] the marker shows the percent change and is
/// sized by its magnitude.
#[must_use]
pub fn spillover_points(
    data: &SpilloverData,
    period: Period,
    crime: CrimeType,
    view: ValueView,
) -> Vec<SpilloverPoint> {
    let raw: Vec<(NeighborState, f64, f64)> = NeighborState::all()
        .iter()
        .map(|&state| {
            let name = state.as_ref();
            (
                state,
                data.period_value(name, period, crime),
                variation(data, name, period, crime),
            )
        })
        .collect();

    let shown = |value: f64, change: f64| match view {
        ValueView::Absolute => value,
        ValueView::Variation => change,
    };
    let max = max_or_zero(raw.iter().map(|(_, v, c)| shown(*v, *c).abs()));

    raw.into_iter()
        .map(|(state, value, change)| {
            let displayed = shown(value, change);
            let ratio = if max > 0.0 { displayed.abs() / max } else { 0.0 };
            let (color, class) = match view {
                ValueView::Absolute => (ratio_color(ratio), ratio_intensity_class(ratio)),
                ValueView::Variation => {
                    (variation_color(displayed), variation_intensity_class(displayed))
                }
            };
            SpilloverPoint {
                state: state.to_string(),
                value,
                variation: change,
                size: marker_size(displayed.abs(), max),
                color: color.to_owned(),
                intensity_class: class.to_owned(),
            }
        })
        .collect()
}

/// CSS class of a border-municipality cell.
#[must_use]
pub fn cell_class(value: f64) -> Option<&'static str> {
    if value > 5.0 {
        Some("high")
    } else if value > 2.0 {
        Some("medium")
    } else if value > 0.0 {
        Some("low")
    } else {
        None
    }
}

/// Month-over-month change of a border municipality, with any cases after
/// a zero month counted as [`NEW_CASE_CHANGE`].
#[must_use]
pub fn border_change(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        percent_change(current, prior)
    } else if current > 0.0 {
        NEW_CASE_CHANGE
    } else {
        0.0
    }
}

fn border_keys(rows: &[CrimeRecord]) -> Vec<(String, String)> {
    let mut keys: Vec<(String, String)> = Vec::new();
    for row in rows {
        let key = (
            row.text(MUNICIPALITY_COLUMN).to_owned(),
            row.text(ENTITY_COLUMN).to_owned(),
        );
        if !key.0.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

fn border_value(rows: &[CrimeRecord], key: &(String, String), period: &str, crime: CrimeType) -> f64 {
    rows.iter()
        .find(|row| {
            row.text(MUNICIPALITY_COLUMN) == key.0
                && row.text(ENTITY_COLUMN) == key.1
                && row.text(PERIOD_COLUMN) == period
        })
        .map_or(0.0, |row| row.crime(crime))
}

/// One row per (municipality, state) pair across `periods`.
#[must_use]
pub fn border_rows(
    rows: &[CrimeRecord],
    periods: &[String],
    crime: CrimeType,
) -> Vec<BorderMunicipalityRow> {
    border_keys(rows)
        .into_iter()
        .map(|key| {
            let values: Vec<f64> = periods
                .iter()
                .map(|period| border_value(rows, &key, period, crime))
                .collect();
            let total: f64 = values.iter().sum();
            BorderMunicipalityRow {
                cell_classes: values
                    .iter()
                    .map(|v| cell_class(*v).map(str::to_owned))
                    .collect(),
                highlighted: total > BORDER_HIGHLIGHT_TOTAL,
                municipality: key.0,
                state: key.1,
                values,
                total,
            }
        })
        .collect()
}

/// Month-over-month changes of each border municipality's `Total`, one
/// entry per period after the first.
#[must_use]
pub fn border_changes(rows: &[CrimeRecord], periods: &[String]) -> Vec<ChangeRow> {
    border_keys(rows)
        .into_iter()
        .map(|key| {
            let changes = periods
                .windows(2)
                .map(|pair| PeriodValue {
                    period: pair[1].clone(),
                    value: border_change(
                        border_value(rows, &key, &pair[1], CrimeType::Total),
                        border_value(rows, &key, &pair[0], CrimeType::Total),
                    ),
                })
                .collect();
            ChangeRow {
                label: format!("{}, {}", key.0, key.1),
                crime: Some(CrimeType::Total),
                changes,
            }
        })
        .collect()
}

/// Border municipalities of one period with a positive value.
#[must_use]
pub fn border_period_values(
    rows: &[CrimeRecord],
    period: &str,
    crime: CrimeType,
) -> Vec<(String, String, f64)> {
    rows.iter()
        .filter(|row| row.text(PERIOD_COLUMN) == period)
        .map(|row| {
            (
                row.text(MUNICIPALITY_COLUMN).to_owned(),
                row.text(ENTITY_COLUMN).to_owned(),
                row.crime(crime),
            )
        })
        .filter(|(_, _, value)| *value > 0.0)
        .collect()
}
