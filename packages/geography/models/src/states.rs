//! The 32 federal entities keyed by INEGI `Clave_Entidad`.

use crate::normalize_name;

/// `Clave_Entidad` of the national aggregate row in the population table.
pub const NATIONAL_CLAVE: u32 = 0;

/// Label of the national aggregate row.
pub const NATIONAL_NAME: &str = "NACIONAL";

/// A federal entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    /// INEGI `Clave_Entidad` (1-32).
    pub clave: u32,
    /// Official name as it appears in the SESNSP datasets.
    pub name: &'static str,
    /// Short label used on compact charts.
    pub abbreviation: &'static str,
}

const fn state(clave: u32, name: &'static str, abbreviation: &'static str) -> StateInfo {
    StateInfo {
        clave,
        name,
        abbreviation,
    }
}

/// All federal entities in clave order.
pub const STATES: &[StateInfo] = &[
    state(1, "Aguascalientes", "AGS"),
    state(2, "Baja California", "BC"),
    state(3, "Baja California Sur", "BCS"),
    state(4, "Campeche", "CAM"),
    state(5, "Coahuila de Zaragoza", "COAH"),
    state(6, "Colima", "COL"),
    state(7, "Chiapas", "CHIS"),
    state(8, "Chihuahua", "CHIH"),
    state(9, "Ciudad de México", "CDMX"),
    state(10, "Durango", "DGO"),
    state(11, "Guanajuato", "GTO"),
    state(12, "Guerrero", "GRO"),
    state(13, "Hidalgo", "HGO"),
    state(14, "Jalisco", "JAL"),
    state(15, "México", "MEX"),
    state(16, "Michoacán de Ocampo", "MICH"),
    state(17, "Morelos", "MOR"),
    state(18, "Nayarit", "NAY"),
    state(19, "Nuevo León", "NL"),
    state(20, "Oaxaca", "OAX"),
    state(21, "Puebla", "PUE"),
    state(22, "Querétaro", "QRO"),
    state(23, "Quintana Roo", "QROO"),
    state(24, "San Luis Potosí", "SLP"),
    state(25, "Sinaloa", "SIN"),
    state(26, "Sonora", "SON"),
    state(27, "Tabasco", "TAB"),
    state(28, "Tamaulipas", "TAMS"),
    state(29, "Tlaxcala", "TLAX"),
    state(30, "Veracruz de Ignacio de la Llave", "VER"),
    state(31, "Yucatán", "YUC"),
    state(32, "Zacatecas", "ZAC"),
];

/// Finds a state by name, ignoring accents and case.
#[must_use]
pub fn state_by_name(name: &str) -> Option<&'static StateInfo> {
    let key = normalize_name(name);
    STATES.iter().find(|s| normalize_name(s.name) == key)
}

/// Finds a state by `Clave_Entidad`.
#[must_use]
pub fn state_by_clave(clave: u32) -> Option<&'static StateInfo> {
    STATES.iter().find(|s| s.clave == clave)
}

/// Returns the `Clave_Entidad` for a state name, or [`NATIONAL_CLAVE`] for
/// the national label.
#[must_use]
pub fn clave_for(name: &str) -> Option<u32> {
    if normalize_name(name) == normalize_name(NATIONAL_NAME) {
        return Some(NATIONAL_CLAVE);
    }
    state_by_name(name).map(|s| s.clave)
}

/// Short label for a state name.
///
/// Unknown names fall back to their first four characters uppercased;
/// empty names become `N/A`.
#[must_use]
pub fn abbreviate(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return "N/A".to_string();
    }
    state_by_name(name).map_or_else(
        || name.chars().take(4).collect::<String>().to_uppercase(),
        |s| s.abbreviation.to_string(),
    )
}
