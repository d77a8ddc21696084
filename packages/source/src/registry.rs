//! Dataset registry, loaded from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a dataset means
//! adding a [`DatasetId`] variant, a TOML file and a line below.

use crate::SourceError;
use crate::dataset_def::{DatasetDefinition, DatasetId, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    // ── Population ───────────────────────────────────────────────────
    ("population", include_str!("../datasets/population.toml")),
    // ── National and state series ────────────────────────────────────
    (
        "national_annual",
        include_str!("../datasets/national_annual.toml"),
    ),
    (
        "national_monthly",
        include_str!("../datasets/national_monthly.toml"),
    ),
    ("state_monthly", include_str!("../datasets/state_monthly.toml")),
    ("state_2025", include_str!("../datasets/state_2025.toml")),
    (
        "state_december_2023",
        include_str!("../datasets/state_december_2023.toml"),
    ),
    // ── Sinaloa ──────────────────────────────────────────────────────
    ("sinaloa_annual", include_str!("../datasets/sinaloa_annual.toml")),
    (
        "sinaloa_monthly",
        include_str!("../datasets/sinaloa_monthly.toml"),
    ),
    (
        "sinaloa_municipal",
        include_str!("../datasets/sinaloa_municipal.toml"),
    ),
    (
        "sinaloa_municipal_subtypes",
        include_str!("../datasets/sinaloa_municipal_subtypes.toml"),
    ),
    (
        "anomalies_reference",
        include_str!("../datasets/anomalies_reference.toml"),
    ),
    ("age_composition", include_str!("../datasets/age_composition.toml")),
    // ── Spillover ────────────────────────────────────────────────────
    ("spillover", include_str!("../datasets/spillover.toml")),
    (
        "border_municipal",
        include_str!("../datasets/border_municipal.toml"),
    ),
    ("border_index", include_str!("../datasets/border_index.toml")),
    // ── Boundaries ───────────────────────────────────────────────────
    ("sinaloa_geojson", include_str!("../datasets/sinaloa_geojson.toml")),
    ("sonora_geojson", include_str!("../datasets/sonora_geojson.toml")),
    (
        "chihuahua_geojson",
        include_str!("../datasets/chihuahua_geojson.toml"),
    ),
    ("durango_geojson", include_str!("../datasets/durango_geojson.toml")),
    ("nayarit_geojson", include_str!("../datasets/nayarit_geojson.toml")),
];

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the registry tests).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up one dataset definition.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if no embedded config has `id`.
pub fn dataset(id: DatasetId) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| SourceError::UnknownDataset { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_datasets() {
        assert_eq!(all_datasets().len(), DatasetId::all().len());
    }

    #[test]
    fn dataset_ids_are_unique() {
        let datasets = all_datasets();
        let mut ids: Vec<DatasetId> = datasets.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DatasetId::all().len());
    }

    #[test]
    fn toml_names_match_ids() {
        for (name, toml) in DATASET_TOMLS {
            let def = parse_dataset_toml(toml).unwrap();
            assert_eq!(def.id.to_string(), *name);
        }
    }

    #[test]
    fn all_datasets_have_required_fields() {
        for dataset in &all_datasets() {
            assert!(!dataset.name.is_empty(), "{}: name is empty", dataset.id);
            assert!(!dataset.file.is_empty(), "{}: file is empty", dataset.id);
            assert!(
                !dataset.attribution.publisher.is_empty(),
                "{}: no publisher",
                dataset.id
            );
        }
    }

    #[test]
    fn looks_up_single_dataset() {
        let population = dataset(DatasetId::Population).unwrap();
        assert_eq!(population.file, "poblacion_estados_2018_2025.csv");
    }
}
