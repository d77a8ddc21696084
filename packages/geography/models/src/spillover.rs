//! Sinaloa's neighboring states and their border municipalities.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{LatLng, names_match};

/// A state included in the spillover analysis.
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
#[strum(ascii_case_insensitive)]
pub enum NeighborState {
    Sinaloa,
    Sonora,
    Chihuahua,
    Durango,
    Nayarit,
}

impl NeighborState {
    /// Sinaloa first, then its neighbors.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Sinaloa,
            Self::Sonora,
            Self::Chihuahua,
            Self::Durango,
            Self::Nayarit,
        ]
    }

    /// Marker position for the state-level spillover map.
    #[must_use]
    pub const fn marker_location(self) -> LatLng {
        match self {
            Self::Sinaloa => LatLng::new(25.0, -107.3894),
            Self::Sonora => LatLng::new(29.0892, -110.9559),
            Self::Chihuahua => LatLng::new(28.6353, -106.0691),
            Self::Durango => LatLng::new(24.0277, -104.6589),
            Self::Nayarit => LatLng::new(21.7514, -104.8455),
        }
    }

    /// `true` for the states bordering Sinaloa.
    #[must_use]
    pub const fn is_neighbor(self) -> bool {
        !matches!(self, Self::Sinaloa)
    }
}

/// Approximate centroids of the neighboring states' border municipalities.
pub const BORDER_MUNICIPALITY_LOCATIONS: &[(&str, LatLng)] = &[
    ("Huatabampo", LatLng::new(26.8261, -109.6422)),
    ("Álamos", LatLng::new(27.0167, -108.9333)),
    ("Chínipas", LatLng::new(27.4, -108.5333)),
    (
        "Batopilas de Manuel Gómez Morín",
        LatLng::new(27.0167, -107.7333),
    ),
    ("Guazapares", LatLng::new(27.45, -108.0833)),
    ("Urique", LatLng::new(27.2167, -107.9167)),
    ("Morelos", LatLng::new(26.6667, -107.6333)),
    ("Guadalupe y Calvo", LatLng::new(26.1, -106.9667)),
    ("Pueblo Nuevo", LatLng::new(23.3833, -105.3833)),
    ("San Dimas", LatLng::new(24.1167, -105.9333)),
    ("Tamazula", LatLng::new(24.9667, -106.9667)),
    ("Acaponeta", LatLng::new(22.5, -105.3667)),
    ("Huajicori", LatLng::new(22.6333, -105.3167)),
    ("Tecuala", LatLng::new(22.4, -105.45)),
];

/// Looks up a border municipality's location, ignoring accents and case.
#[must_use]
pub fn border_municipality_location(name: &str) -> Option<LatLng> {
    BORDER_MUNICIPALITY_LOCATIONS
        .iter()
        .find(|(known, _)| names_match(known, name))
        .map(|(_, location)| *location)
}
