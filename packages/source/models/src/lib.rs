#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parsed dataset rows and the shapes of the JSON datasets.
//!
//! Every CSV row is kept as a [`CrimeRecord`]: the header-to-text mapping
//! exactly as parsed. Numeric interpretation happens on read, where a
//! missing or non-numeric cell counts as zero.

pub mod json;

pub use json::{AgeCompositionData, BorderMunicipalityIndex, SpilloverData};

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use sinaloa_report_crime_models::{CrimeType, Period};
use sinaloa_report_geography_models::LatLng;
use strum_macros::{AsRefStr, Display, EnumString};

/// How a dataset file is encoded.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetFormat {
    /// Comma-separated, no quoting.
    Csv,
    /// Comma-separated with double-quoted fields.
    QuotedCsv,
    /// A `GeoJSON` feature collection.
    GeoJson,
    /// Arbitrary JSON document.
    Json,
}

/// Parses a numeric cell. Missing or non-numeric text counts as zero.
#[must_use]
pub fn parse_count(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// One row of a CSV dataset, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrimeRecord {
    fields: Vec<(String, String)>,
}

impl CrimeRecord {
    /// Creates a record from `(header, value)` pairs.
    #[must_use]
    pub const fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Convenience constructor for tests and fixtures.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    /// Raw cell text, if the column exists.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
    }

    /// Cell text, or `""` when the column is missing.
    #[must_use]
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Numeric cell value; missing or non-numeric cells are zero.
    #[must_use]
    pub fn count(&self, column: &str) -> f64 {
        self.get(column).map_or(0.0, parse_count)
    }

    /// Numeric value of a crime column.
    #[must_use]
    pub fn crime(&self, crime: CrimeType) -> f64 {
        self.count(crime.column())
    }

    /// Parses the `Periodo` column.
    #[must_use]
    pub fn period(&self) -> Option<Period> {
        self.get("Periodo").and_then(|p| p.parse().ok())
    }

    /// Column headers in order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(header, _)| header.as_str())
    }

    /// `(header, value)` pairs in order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for CrimeRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (header, value) in &self.fields {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Yearly population per `Clave_Entidad`, used as the rate denominator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationTable {
    entries: BTreeMap<u32, BTreeMap<u16, u64>>,
}

impl PopulationTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Records a population. Zero populations are ignored, and the first
    /// value recorded for a `(clave, year)` pair wins.
    pub fn insert(&mut self, clave: u32, year: u16, population: u64) {
        if population == 0 {
            return;
        }
        self.entries
            .entry(clave)
            .or_default()
            .entry(year)
            .or_insert(population);
    }

    /// Returns `true` if `clave` already has a row.
    #[must_use]
    pub fn contains(&self, clave: u32) -> bool {
        self.entries.contains_key(&clave)
    }

    /// Population for an entity and year, if known.
    #[must_use]
    pub fn population(&self, clave: u32, year: u16) -> Option<u64> {
        self.entries.get(&clave)?.get(&year).copied()
    }

    /// Number of entities with at least one population value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no populations are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named `GeoJSON` feature reduced to what the report needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeature {
    /// Name from `NOMGEO`, `nom_mun` or `NOM_MUN`.
    pub name: String,
    /// Center of the feature's bounding box.
    pub center: Option<LatLng>,
    /// The raw `GeoJSON` geometry, passed through to map layers.
    pub geometry: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_non_numeric_cells_are_zero() {
        let record = CrimeRecord::from_pairs(&[("Total", "12"), ("Feminicidio", "n/d")]);
        assert!((record.count("Total") - 12.0).abs() < f64::EPSILON);
        assert!(record.count("Feminicidio").abs() < f64::EPSILON);
        assert!(record.count("Homicidio doloso").abs() < f64::EPSILON);
        assert_eq!(record.text("Estado"), "");
    }

    #[test]
    fn reads_crime_columns_by_type() {
        let record = CrimeRecord::from_pairs(&[(
            "Otros delitos que atentan contra la vida y la integridad corporal",
            " 7 ",
        )]);
        assert!((record.crime(CrimeType::OtrosDelitos) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_period_column() {
        let record = CrimeRecord::from_pairs(&[("Periodo", "Agosto 2024")]);
        assert_eq!(record.period().map(|p| p.to_string()).as_deref(), Some("Agosto 2024"));
    }

    #[test]
    fn serializes_in_column_order() {
        let record = CrimeRecord::from_pairs(&[("B", "2"), ("A", "1")]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"B":"2","A":"1"}"#);
    }

    #[test]
    fn population_ignores_zero_and_keeps_first_value() {
        let mut table = PopulationTable::new();
        table.insert(25, 2024, 3_000_000);
        table.insert(25, 2024, 1);
        table.insert(26, 2024, 0);
        assert_eq!(table.population(25, 2024), Some(3_000_000));
        assert_eq!(table.population(26, 2024), None);
        assert_eq!(table.population(25, 2019), None);
    }
}
