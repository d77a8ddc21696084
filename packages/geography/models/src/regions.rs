//! Sinaloa's four regions and the municipalities that make them up.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{LatLng, names_match};

/// Label used for a municipality that belongs to no known region.
pub const UNASSIGNED_REGION: &str = "Sin región";

/// Polygon fill for municipalities outside every region.
pub const UNASSIGNED_COLOR: &str = "#95a5a6";

/// A region of Sinaloa.
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
pub enum Region {
    /// Northern border with Sonora and Chihuahua.
    Norte,
    /// Guasave and the Évora valley.
    CentroNorte,
    /// Culiacán and its neighbors.
    Centro,
    /// Mazatlán and the southern coast.
    Sur,
}

impl Region {
    /// Returns all regions north to south.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Norte, Self::CentroNorte, Self::Centro, Self::Sur]
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Norte => "Norte",
            Self::CentroNorte => "Centro Norte",
            Self::Centro => "Centro",
            Self::Sur => "Sur",
        }
    }

    /// Fill color for municipality polygons.
    #[must_use]
    pub const fn polygon_color(self) -> &'static str {
        match self {
            Self::Norte => "#e74c3c",
            Self::CentroNorte => "#3498db",
            Self::Centro => "#2ecc71",
            Self::Sur => "#f39c12",
        }
    }

    /// Fill color for circle markers, a shade darker than the polygon.
    #[must_use]
    pub const fn circle_color(self) -> &'static str {
        match self {
            Self::Norte => "#c0392b",
            Self::CentroNorte => "#2980b9",
            Self::Centro => "#27ae60",
            Self::Sur => "#d68910",
        }
    }

    /// Member municipality names, in catalog order.
    pub fn members(self) -> impl Iterator<Item = &'static str> {
        SINALOA_MUNICIPALITIES
            .iter()
            .filter(move |m| m.region == self)
            .map(|m| m.name)
    }

    /// Looks up the region of a municipality, ignoring accents and case.
    #[must_use]
    pub fn of(municipality: &str) -> Option<Self> {
        municipality_info(municipality).map(|m| m.region)
    }
}

/// Static reference data for one Sinaloa municipality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MunicipalityInfo {
    /// Official name.
    pub name: &'static str,
    /// Region the municipality belongs to.
    pub region: Region,
    /// Approximate centroid (INEGI 2022).
    pub location: LatLng,
}

const fn municipality(name: &'static str, region: Region, lat: f64, lng: f64) -> MunicipalityInfo {
    MunicipalityInfo {
        name,
        region,
        location: LatLng::new(lat, lng),
    }
}

/// All 20 municipalities of Sinaloa.
pub const SINALOA_MUNICIPALITIES: &[MunicipalityInfo] = &[
    municipality("Ahome", Region::Norte, 25.9353, -109.1622),
    municipality("El Fuerte", Region::Norte, 26.2620, -108.6784),
    municipality("Choix", Region::Norte, 26.6803, -108.2770),
    municipality("Angostura", Region::CentroNorte, 25.1460, -108.1417),
    municipality("Guasave", Region::CentroNorte, 25.5181, -108.5491),
    municipality("Mocorito", Region::CentroNorte, 25.3599, -107.7796),
    municipality("Salvador Alvarado", Region::CentroNorte, 25.4185, -108.0760),
    municipality("Sinaloa", Region::CentroNorte, 25.9691, -108.1088),
    municipality("Juan José Ríos", Region::CentroNorte, 25.6897, -108.8555),
    municipality("Badiraguato", Region::Centro, 25.5909, -107.3960),
    municipality("Eldorado", Region::Centro, 24.3543, -107.4047),
    municipality("Cosalá", Region::Centro, 24.4815, -106.7994),
    municipality("Culiacán", Region::Centro, 24.6812, -107.2529),
    municipality("Elota", Region::Centro, 24.0434, -106.8421),
    municipality("Navolato", Region::Centro, 24.7232, -107.7648),
    municipality("Concordia", Region::Sur, 23.4142, -105.9918),
    municipality("Rosario", Region::Sur, 23.0562, -105.8054),
    municipality("Escuinapa", Region::Sur, 22.7240, -105.6859),
    municipality("Mazatlán", Region::Sur, 23.4683, -106.3060),
    municipality("San Ignacio", Region::Sur, 23.9545, -106.3702),
];

/// Finds a Sinaloa municipality by name, ignoring accents and case.
#[must_use]
pub fn municipality_info(name: &str) -> Option<&'static MunicipalityInfo> {
    SINALOA_MUNICIPALITIES
        .iter()
        .find(|m| names_match(m.name, name))
}

/// Region display name for a municipality, or [`UNASSIGNED_REGION`].
#[must_use]
pub fn region_name(municipality: &str) -> &'static str {
    Region::of(municipality).map_or(UNASSIGNED_REGION, Region::name)
}

/// Polygon color for a municipality's region, or [`UNASSIGNED_COLOR`].
#[must_use]
pub fn region_polygon_color(municipality: &str) -> &'static str {
    Region::of(municipality).map_or(UNASSIGNED_COLOR, Region::polygon_color)
}
