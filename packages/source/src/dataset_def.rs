//! Config-driven dataset definitions.
//!
//! [`DatasetDefinition`] captures everything the loader needs to know about
//! one input file: where it lives relative to the data root and how to
//! parse it. Definitions are embedded TOML (see [`crate::registry`]).

use serde::{Deserialize, Serialize};
use sinaloa_report_geography_models::spillover::NeighborState;
use sinaloa_report_source_models::DatasetFormat;
use strum_macros::{AsRefStr, Display, EnumString};

/// Identifier of every dataset the report reads.
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
pub enum DatasetId {
    Population,
    NationalAnnual,
    NationalMonthly,
    SinaloaAnnual,
    SinaloaMonthly,
    StateMonthly,
    #[serde(rename = "state_2025")]
    #[strum(serialize = "state_2025")]
    State2025,
    #[serde(rename = "state_december_2023")]
    #[strum(serialize = "state_december_2023")]
    StateDecember2023,
    SinaloaMunicipal,
    SinaloaMunicipalSubtypes,
    AnomaliesReference,
    Spillover,
    BorderMunicipal,
    BorderIndex,
    AgeComposition,
    SinaloaGeojson,
    SonoraGeojson,
    ChihuahuaGeojson,
    DurangoGeojson,
    NayaritGeojson,
}

impl DatasetId {
    /// Returns all dataset identifiers.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Population,
            Self::NationalAnnual,
            Self::NationalMonthly,
            Self::SinaloaAnnual,
            Self::SinaloaMonthly,
            Self::StateMonthly,
            Self::State2025,
            Self::StateDecember2023,
            Self::SinaloaMunicipal,
            Self::SinaloaMunicipalSubtypes,
            Self::AnomaliesReference,
            Self::Spillover,
            Self::BorderMunicipal,
            Self::BorderIndex,
            Self::AgeComposition,
            Self::SinaloaGeojson,
            Self::SonoraGeojson,
            Self::ChihuahuaGeojson,
            Self::DurangoGeojson,
            Self::NayaritGeojson,
        ]
    }

    /// The municipality-polygon dataset for a spillover state.
    #[must_use]
    pub const fn geojson_for(state: NeighborState) -> Self {
        match state {
            NeighborState::Sinaloa => Self::SinaloaGeojson,
            NeighborState::Sonora => Self::SonoraGeojson,
            NeighborState::Chihuahua => Self::ChihuahuaGeojson,
            NeighborState::Durango => Self::DurangoGeojson,
            NeighborState::Nayarit => Self::NayaritGeojson,
        }
    }
}

/// A dataset definition loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier.
    pub id: DatasetId,
    /// Human-readable title.
    pub name: String,
    /// File name relative to the data root.
    pub file: String,
    /// How the file is encoded.
    pub format: DatasetFormat,
    /// What the file contains.
    pub description: String,
    /// Optional datasets are not reported as load failures when absent.
    #[serde(default)]
    pub optional: bool,
    /// Where the numbers come from.
    pub attribution: Attribution,
}

/// Provenance of a dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct Attribution {
    /// Publishing agency (e.g. `"SESNSP"`, `"INEGI"`).
    pub publisher: String,
    /// Free-form note shown under tables.
    #[serde(default)]
    pub note: Option<String>,
}

impl Attribution {
    /// Source line for table footers, e.g. `"Fuente: SESNSP. Incidencia delictiva"`.
    #[must_use]
    pub fn source_line(&self) -> String {
        self.note.as_ref().map_or_else(
            || format!("Fuente: {}.", self.publisher),
            |note| format!("Fuente: {}. {note}.", self.publisher),
        )
    }
}

/// Parses a TOML string into a [`DatasetDefinition`].
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, toml::de::Error> {
    toml::de::from_str(toml_str)
}
