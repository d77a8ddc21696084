#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic entities used by the homicide report.
//!
//! Covers the 32 federal entities (with their INEGI `Clave_Entidad`), the
//! national aggregate, Sinaloa's municipalities grouped into four static
//! regions, and the neighboring states and border municipalities used by
//! the spillover analysis.
//!
//! Names coming from CSVs and `GeoJSON` files disagree on accents and
//! casing, so every lookup goes through [`normalize_name`].

pub mod regions;
pub mod spillover;
pub mod states;

pub use regions::{MunicipalityInfo, Region, SINALOA_MUNICIPALITIES};
pub use states::{NATIONAL_CLAVE, NATIONAL_NAME, STATES, StateInfo};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The unit a row of data describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Entity {
    /// A municipality, by name.
    Municipality(String),
    /// A federal entity, by name.
    State(String),
    /// The national aggregate.
    National,
}

impl Entity {
    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Municipality(name) | Self::State(name) => name,
            Self::National => NATIONAL_NAME,
        }
    }

    /// Returns `true` if this entity matches `name` ignoring accents and case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        names_match(self.name(), name)
    }
}

/// Folds a place name for comparison: trims, decomposes to NFD, drops
/// combining marks and lowercases.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Accent- and case-insensitive name equality.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_and_case() {
        assert_eq!(normalize_name("  Culiacán "), "culiacan");
        assert_eq!(normalize_name("JUAN JOSÉ RÍOS"), "juan jose rios");
        assert_eq!(normalize_name("Cosalá"), "cosala");
        assert_eq!(normalize_name("Peñón"), "penon");
    }

    #[test]
    fn names_match_ignores_accents() {
        assert!(names_match("Mazatlán", "MAZATLAN"));
        assert!(!names_match("Mazatlán", "Mocorito"));
    }

    #[test]
    fn names_match_decomposed_accents() {
        assert!(names_match("Culiacán", "Culiaca\u{301}n"));
        assert_eq!(normalize_name("Pen\u{303}o\u{301}n"), "penon");
    }

    #[test]
    fn national_entity_name() {
        assert_eq!(Entity::National.name(), "NACIONAL");
        assert!(Entity::Municipality("Culiacán".to_string()).matches("culiacan"));
    }
}
