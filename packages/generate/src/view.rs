//! Serializable view models.
//!
//! Sections describe charts, tables and maps as plain data; drawing them
//! is left to whatever frontend reads the JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sinaloa_report_analytics_models::LegendEntry;
use sinaloa_report_geography_models::LatLng;

use crate::GenerateError;

/// Chart type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub color: String,
    /// Overrides the chart type for mixed charts.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
}

impl ChartDataset {
    #[must_use]
    pub fn new(label: impl Into<String>, data: Vec<f64>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data,
            color: color.into(),
            kind: None,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A labeled vertical rule drawn at one x-axis label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalMarker {
    pub at: String,
    pub text: String,
    pub color: String,
}

/// A chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<VerticalMarker>,
}

impl ChartConfig {
    #[must_use]
    pub fn new(id: &str, kind: ChartKind, title: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.into(),
            labels,
            datasets: Vec::new(),
            y_axis: None,
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_y_axis(mut self, title: impl Into<String>) -> Self {
        self.y_axis = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: ChartDataset) -> Self {
        self.datasets.push(dataset);
        self
    }
}

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub text: String,
    /// CSS class hint, e.g. `high` or `war-start`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl TableCell {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
        }
    }

    /// A count, without decimals when it is whole.
    #[must_use]
    pub fn count(value: f64) -> Self {
        Self::text(format_count(value))
    }

    /// A number with a fixed number of decimals.
    #[must_use]
    pub fn decimal(value: f64, decimals: usize) -> Self {
        Self::text(format!("{value:.decimals$}"))
    }

    /// A signed percentage with one decimal.
    #[must_use]
    pub fn percent(value: f64) -> Self {
        Self::text(format_percent(value))
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

/// A table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableModel {
    pub id: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<TableCell>>,
    /// Indices into `rows`.
    pub highlighted_rows: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TableModel {
    #[must_use]
    pub fn new(id: &str, title: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            headers,
            rows: Vec::new(),
            highlighted_rows: Vec::new(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn push_row(&mut self, cells: Vec<TableCell>, highlighted: bool) {
        if highlighted {
            self.highlighted_rows.push(self.rows.len());
        }
        self.rows.push(cells);
    }
}

/// A filled polygon on a map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFeature {
    pub name: String,
    pub fill: String,
    pub value: f64,
    pub intensity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,
}

/// A circle marker on a map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub name: String,
    pub location: LatLng,
    /// Pixels, or meters when `radius_in_meters` is set.
    pub radius: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub radius_in_meters: bool,
    pub color: String,
    /// Label → value lines shown in the popup.
    pub popup: BTreeMap<String, String>,
}

/// One map: polygons, markers and a legend for a single period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub features: Vec<MapFeature>,
    pub markers: Vec<MapMarker>,
    pub legend: Vec<LegendEntry>,
}

impl MapLayer {
    #[must_use]
    pub fn new(id: &str, title: impl Into<String>, period: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            period: period.map(str::to_string),
            features: Vec::new(),
            markers: Vec::new(),
            legend: Vec::new(),
        }
    }
}

/// The document written for one report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    pub title: String,
    pub charts: Vec<ChartConfig>,
    pub tables: Vec<TableModel>,
    pub maps: Vec<MapLayer>,
    /// The computed metrics behind the views, keyed by name.
    pub metrics: BTreeMap<String, serde_json::Value>,
}

impl Section {
    #[must_use]
    pub fn new(name: &str, title: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            title: title.into(),
            charts: Vec::new(),
            tables: Vec::new(),
            maps: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Attaches a serialized metric.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Json`] if `value` cannot be serialized.
    pub fn metric(&mut self, key: &str, value: &impl Serialize) -> Result<(), GenerateError> {
        self.metrics
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Whether the section has anything to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty() && self.tables.is_empty() && self.maps.is_empty()
    }
}

/// `1234` for whole values, `12.5` otherwise.
#[must_use]
pub fn format_count(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// `+12.3%`, `-4.0%` or `0.0%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}
