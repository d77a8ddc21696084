#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derived-metric result types.
//!
//! Every value here is recomputed from the source datasets on each run and
//! never persisted on its own. Types serialize to camelCase JSON so report
//! sections can embed them directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sinaloa_report_crime_models::{AgeRange, CrimeType};
use strum_macros::{AsRefStr, Display, EnumString};

/// One value per crime column.
pub type CrimeValues = BTreeMap<CrimeType, f64>;

/// Which maximum a color intensity is normalized against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NormalizationBasis {
    /// Maximum among the values currently displayed.
    #[default]
    PeriodMax,
    /// Maximum across every period of the dataset.
    GlobalMax,
}

/// Whether a map shows raw counts or percent change.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueView {
    /// Absolute counts.
    #[default]
    Absolute,
    /// Percent change against the comparison period.
    Variation,
}

/// A value attached to a period label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodValue {
    /// Period label (`"Enero 2024"` or `"2024"`).
    pub period: String,
    /// The value.
    pub value: f64,
}

/// One swatch of a map legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Range description, e.g. `">= 80%"`.
    pub label: String,
    /// Fill color.
    pub color: String,
}

/// A row of an annual rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualRateRow {
    /// Row label (crime type label).
    pub label: String,
    /// Rate per 100k for each year.
    pub by_year: BTreeMap<u16, f64>,
    /// Rate of the summed counts over the mean population.
    pub total: f64,
}

/// A row of percent changes across periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRow {
    /// Row label (crime type label or `TOTAL VIOLENCIA HOMICIDA`).
    pub label: String,
    /// Crime column the row was computed from, if any.
    pub crime: Option<CrimeType>,
    /// Percent change per period, in period order.
    pub changes: Vec<PeriodValue>,
}

/// How much one crime type contributed to the change between two years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRow {
    /// Crime type.
    pub crime: CrimeType,
    /// Count in the earlier year.
    pub previous: f64,
    /// Count in the later year.
    pub current: f64,
    /// `current - previous`.
    pub absolute_change: f64,
    /// Percent change; 0 when `previous` is 0.
    pub relative_change: f64,
    /// Signed share of the total absolute change, in percent.
    pub weight: f64,
}

/// Contribution analysis between two years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionAnalysis {
    /// Earlier year.
    pub from_year: u16,
    /// Later year.
    pub to_year: u16,
    /// One row per component crime type found in the data.
    pub rows: Vec<ContributionRow>,
    /// Sum of `previous` over all rows.
    pub previous_total: f64,
    /// Sum of `current` over all rows.
    pub current_total: f64,
    /// `current_total - previous_total`.
    pub total_change: f64,
    /// Percent change of the totals; 0 when `previous_total` is 0.
    pub total_relative_change: f64,
}

/// Headline figures for the summary cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    /// All homicidal violence over the covered years.
    pub total_violence: f64,
    /// Homicidio doloso over the covered years.
    pub homicidio_doloso: f64,
    /// Feminicidio over the covered years.
    pub feminicidio: f64,
    /// Percent change of the last year against the one before, one decimal.
    pub variation: f64,
}

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    /// Entity name.
    pub name: String,
    /// Value ranked on.
    pub value: f64,
    /// Whether this entry is the highlighted entity.
    pub highlighted: bool,
}

/// Top-N ranking for one period and crime type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingTable {
    /// Period label.
    pub period: String,
    /// Crime column ranked on.
    pub crime: CrimeType,
    /// Entries, highest value first.
    pub entries: Vec<RankedEntry>,
}

/// An entity with one value per crime column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    /// Entity name (`NACIONAL` for the aggregate).
    pub name: String,
    /// `Clave_Entidad`, when known.
    pub clave: Option<u32>,
    /// Value per crime column.
    pub values: CrimeValues,
}

/// One municipality in a period snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalRow {
    /// 1-based position by total.
    pub rank: usize,
    /// Municipality name.
    pub municipality: String,
    /// Value per crime column.
    pub values: CrimeValues,
    /// Top-3 rows are highlighted.
    pub highlighted: bool,
}

/// Aggregate figures for a period snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    /// Sum of positive values.
    pub total: f64,
    /// Number of municipalities with a positive value.
    pub affected: usize,
    /// Municipality with the highest value (first one on ties).
    pub max_municipality: Option<String>,
    /// The highest value.
    pub max_value: f64,
}

/// Municipalities of one period, sorted by total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalSnapshot {
    /// Period label.
    pub period: String,
    /// Rows, highest total first.
    pub rows: Vec<MunicipalRow>,
    /// Aggregate figures for the selected crime column.
    pub stats: SnapshotStats,
}

/// A municipality's contribution to a regional total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberValue {
    /// Municipality name.
    pub municipality: String,
    /// Its value.
    pub value: f64,
}

/// Sum of a crime column over one region's municipalities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalTotal {
    /// Region display name.
    pub region: String,
    /// Sum over member municipalities.
    pub total: f64,
    /// Members with a positive value, highest first.
    pub members: Vec<MemberValue>,
}

/// One region's values across periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalTableRow {
    /// Region display name.
    pub region: String,
    /// Regional total per period, in period order.
    pub values: Vec<f64>,
    /// Sum across periods.
    pub total: f64,
}

/// Averages before and after the September 2024 break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarComparison {
    /// Entity the series belongs to.
    pub entity: String,
    /// Series label (crime subtype).
    pub series: String,
    /// Mean of the pre-war months present.
    pub pre_average: f64,
    /// Mean of the post-war months present.
    pub post_average: f64,
    /// Percent change of the averages; 0 when the pre-war average is 0.
    pub percent_change: f64,
    /// `post_average - pre_average`.
    pub absolute_change: f64,
    /// Sum of pre-war cases.
    pub pre_cases: f64,
    /// Sum of post-war cases.
    pub post_cases: f64,
}

/// A published figure that disagrees with the derived comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleFigure {
    /// Municipality.
    pub entity: String,
    /// Crime subtype.
    pub series: String,
    /// Which figure disagrees.
    pub field: String,
    /// Value in the published table.
    pub published: f64,
    /// Value derived from the monthly series.
    pub derived: f64,
}

/// A state marker on the spillover map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpilloverPoint {
    /// State name.
    pub state: String,
    /// Count for the period.
    pub value: f64,
    /// Percent change against the comparison period.
    pub variation: f64,
    /// Marker diameter in pixels.
    pub size: f64,
    /// Marker fill color.
    pub color: String,
    /// CSS intensity class.
    pub intensity_class: String,
}

/// A neighboring-state municipality bordering Sinaloa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderMunicipalityRow {
    /// Municipality name.
    pub municipality: String,
    /// State name.
    pub state: String,
    /// Value per period, in period order.
    pub values: Vec<f64>,
    /// CSS class per period value (`high`, `medium`, `low` or none).
    pub cell_classes: Vec<Option<String>>,
    /// Sum across periods.
    pub total: f64,
    /// Rows with a large total are highlighted.
    pub highlighted: bool,
}

/// Count and share of one age range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeShare {
    /// Age range.
    pub range: AgeRange,
    /// Victims in this range.
    pub count: f64,
    /// Percent of the month's total, two decimals.
    pub percentage: f64,
}

/// Age breakdown for one subtype and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCompositionMonth {
    /// Period label.
    pub period: String,
    /// Victims across all ranges.
    pub total: f64,
    /// One entry per age range.
    pub shares: Vec<AgeShare>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crime_values_serialize_with_snake_case_keys() {
        let mut values = CrimeValues::new();
        values.insert(CrimeType::HomicidioDoloso, 3.0);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"{"homicidio_doloso":3.0}"#);
    }

    #[test]
    fn normalization_basis_parses_from_config_strings() {
        let basis: NormalizationBasis = "global_max".parse().unwrap();
        assert_eq!(basis, NormalizationBasis::GlobalMax);
        assert_eq!(NormalizationBasis::default(), NormalizationBasis::PeriodMax);
    }
}
