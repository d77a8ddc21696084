//! Shapes of the JSON datasets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sinaloa_report_crime_models::{AgeRange, CrimeType, Month, Period};
use sinaloa_report_geography_models::names_match;

type MonthlyCounts = BTreeMap<String, BTreeMap<String, f64>>;

/// `spillover_data.json`: state → year → month → crime column → count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpilloverData(BTreeMap<String, BTreeMap<String, MonthlyCounts>>);

impl SpilloverData {
    /// Count for a state, month and crime. Anything missing is zero.
    #[must_use]
    pub fn value(&self, state: &str, year: u16, month: Month, crime: CrimeType) -> f64 {
        self.0
            .iter()
            .find(|(name, _)| names_match(name, state))
            .and_then(|(_, years)| years.get(&year.to_string()))
            .and_then(|months| months.get(month.as_ref()))
            .and_then(|crimes| crimes.get(crime.column()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Count for a month period; bare years are zero.
    #[must_use]
    pub fn period_value(&self, state: &str, period: Period, crime: CrimeType) -> f64 {
        match period {
            Period::Month { year, month } => self.value(state, year, month, crime),
            Period::Year(_) => 0.0,
        }
    }

    /// State names present in the file.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `true` if the file had no states.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of `municipios_fronterizos_sinaloa.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderMunicipality {
    /// Municipality name.
    pub nombre: String,
}

/// `municipios_fronterizos_sinaloa.json`: which municipalities of each
/// neighboring state touch Sinaloa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderMunicipalityIndex {
    /// State name → border municipalities. Null entries are tolerated.
    #[serde(default)]
    pub estados: BTreeMap<String, Vec<Option<BorderMunicipality>>>,
}

impl BorderMunicipalityIndex {
    /// Returns `true` if `municipality` is listed as a border municipality
    /// of `state`.
    #[must_use]
    pub fn contains(&self, state: &str, municipality: &str) -> bool {
        if state.is_empty() || municipality.is_empty() {
            return false;
        }
        self.estados
            .iter()
            .filter(|(name, _)| names_match(name, state))
            .flat_map(|(_, list)| list.iter().flatten())
            .any(|m| names_match(&m.nombre, municipality))
    }
}

/// `sinaloa_edad_composicion.json`: subtype → `"Mes Año"` → age range → count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeCompositionData(BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>);

impl AgeCompositionData {
    /// Subtype names present in the file.
    pub fn subtypes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Month periods recorded for a subtype, in calendar order.
    ///
    /// Labels that do not parse as `"Mes Año"` are skipped.
    #[must_use]
    pub fn periods(&self, subtype: &str) -> Vec<Period> {
        let Some(months) = self.0.get(subtype) else {
            return Vec::new();
        };
        let mut periods: Vec<Period> = months.keys().filter_map(|l| l.parse().ok()).collect();
        periods.sort_by_key(|p| match p {
            Period::Month { year, month } => (*year, month.number()),
            Period::Year(year) => (*year, 0),
        });
        periods
    }

    /// Count for a subtype, month and age range. Anything missing is zero.
    #[must_use]
    pub fn count(&self, subtype: &str, period: Period, range: AgeRange) -> f64 {
        self.0
            .get(subtype)
            .and_then(|months| months.get(&period.to_string()))
            .and_then(|ranges| ranges.get(range.label()))
            .copied()
            .unwrap_or(0.0)
    }
}
