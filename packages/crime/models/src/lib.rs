#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Homicidal-violence crime types and report periods.
//!
//! The SESNSP datasets report "violencia homicida" as four crime columns
//! plus a `Total` column. Every dataset in the report uses the exact column
//! names returned by [`CrimeType::column`], so this crate is the single
//! place those strings live.

pub mod period;

pub use period::{Month, Period, PeriodParseError};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A homicidal-violence crime column.
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
pub enum CrimeType {
    /// Intentional homicide.
    HomicidioDoloso,
    /// Negligent homicide.
    HomicidioCulposo,
    /// Gender-motivated killing of a woman.
    Feminicidio,
    /// Other crimes against life and bodily integrity.
    OtrosDelitos,
    /// Sum of the four component columns.
    Total,
}

impl CrimeType {
    /// Returns all crime types, components first and `Total` last.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::HomicidioDoloso,
            Self::HomicidioCulposo,
            Self::Feminicidio,
            Self::OtrosDelitos,
            Self::Total,
        ]
    }

    /// Returns the four component crime types (everything except `Total`).
    #[must_use]
    pub const fn components() -> &'static [Self] {
        &[
            Self::HomicidioDoloso,
            Self::HomicidioCulposo,
            Self::Feminicidio,
            Self::OtrosDelitos,
        ]
    }

    /// Returns the CSV column header used by the source datasets.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::HomicidioDoloso => "Homicidio doloso",
            Self::HomicidioCulposo => "Homicidio culposo",
            Self::Feminicidio => "Feminicidio",
            Self::OtrosDelitos => {
                "Otros delitos que atentan contra la vida y la integridad corporal"
            }
            Self::Total => "Total",
        }
    }

    /// Returns the short label shown in table headers and chart legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HomicidioDoloso => "Homicidio doloso",
            Self::HomicidioCulposo => "Homicidio culposo",
            Self::Feminicidio => "Feminicidio",
            Self::OtrosDelitos => "Otros delitos contra la vida",
            Self::Total => "Violencia homicida total",
        }
    }

    /// Looks up a crime type by its CSV column header or its short label.
    #[must_use]
    pub fn from_column(column: &str) -> Option<Self> {
        let column = column.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.column() == column || c.label() == column)
    }

    /// Line color used for this crime type in the national and state charts.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::HomicidioDoloso => "#e74c3c",
            Self::HomicidioCulposo => "#3498db",
            Self::Feminicidio => "#9b59b6",
            Self::OtrosDelitos => "#f39c12",
            Self::Total => "#2c3e50",
        }
    }
}

/// Victim age bracket used by the age-composition dataset.
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
pub enum AgeRange {
    /// Victims aged 0-17.
    Minors,
    /// Victims aged 18 and over.
    Adults,
    /// Age recorded as "not specified".
    NotSpecified,
    /// Victim not identified.
    NotIdentified,
}

impl AgeRange {
    /// Returns all age ranges in dataset order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minors,
            Self::Adults,
            Self::NotSpecified,
            Self::NotIdentified,
        ]
    }

    /// Returns the key used in the age-composition JSON.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minors => "Menores de edad (0-17)",
            Self::Adults => "Adultos (18 y más)",
            Self::NotSpecified => "No especificado",
            Self::NotIdentified => "No identificado",
        }
    }

    /// Looks up an age range by its JSON key.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.label() == label.trim())
    }

    /// Bar color for the stacked age chart.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Minors => "#e74c3c",
            Self::Adults => "#3498db",
            Self::NotSpecified => "#95a5a6",
            Self::NotIdentified => "#34495e",
        }
    }
}
