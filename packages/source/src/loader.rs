//! The singly-owned dataset loader.
//!
//! [`ReportData::load`] reads every registered dataset concurrently and
//! resolves once all of them have either loaded or failed. A failed dataset
//! is logged and recorded in [`ReportData::statuses`]; everything that
//! depends on it sees an empty table instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sinaloa_report_source_models::{
    AgeCompositionData, BorderMunicipalityIndex, CrimeRecord, DatasetFormat, GeoFeature,
    PopulationTable, SpilloverData,
};

use crate::dataset_def::{DatasetDefinition, DatasetId};
use crate::fetch::DataSource;
use crate::parsing::{parse_csv, parse_quoted_csv, population_table};
use crate::progress::ProgressCallback;
use crate::{SourceError, features};

/// Outcome of loading one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatus {
    /// Dataset identifier.
    pub id: DatasetId,
    /// File name relative to the data root.
    pub file: String,
    /// Whether the dataset loaded and parsed.
    pub loaded: bool,
    /// Whether the dataset is optional.
    pub optional: bool,
    /// Number of rows or features parsed.
    pub rows: usize,
    /// Error message when loading failed.
    pub error: Option<String>,
}

enum Parsed {
    Table(Vec<CrimeRecord>),
    Features(Vec<GeoFeature>),
    Json(serde_json::Value),
}

/// Every dataset the report needs, loaded once.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    tables: BTreeMap<DatasetId, Vec<CrimeRecord>>,
    features: BTreeMap<DatasetId, Vec<GeoFeature>>,
    source_lines: BTreeMap<DatasetId, String>,
    /// Population per `Clave_Entidad` and year.
    pub population: PopulationTable,
    /// Monthly counts for Sinaloa and its neighbors.
    pub spillover: SpilloverData,
    /// Which neighboring municipalities border Sinaloa.
    pub border_index: BorderMunicipalityIndex,
    /// Victim counts by age range.
    pub age_composition: AgeCompositionData,
    /// One entry per dataset attempted, in registry order.
    pub statuses: Vec<DatasetStatus>,
}

impl ReportData {
    /// Loads `datasets` from `source` concurrently.
    ///
    /// Never fails: each dataset that cannot be read or parsed is logged
    /// and marked as not loaded.
    pub async fn load(
        source: &dyn DataSource,
        datasets: &[DatasetDefinition],
        progress: &Arc<dyn ProgressCallback>,
    ) -> Self {
        log::info!(
            "[loader] Loading {} datasets from {}",
            datasets.len(),
            source.describe()
        );
        progress.set_total(datasets.len() as u64);

        let results = futures::future::join_all(datasets.iter().map(|def| async move {
            progress.set_message(format!("Loading {}", def.file));
            let result = load_one(source, def).await;
            progress.inc(1);
            (def, result)
        }))
        .await;

        let mut data = Self::default();
        for (def, result) in results {
            data.absorb(def, result);
        }

        let loaded = data.statuses.iter().filter(|s| s.loaded).count();
        log::info!("[loader] {loaded}/{} datasets loaded", datasets.len());
        progress.finish(format!("{loaded}/{} datasets loaded", datasets.len()));

        data
    }

    fn absorb(&mut self, def: &DatasetDefinition, result: Result<Parsed, SourceError>) {
        let result = result.and_then(|parsed| self.store(def.id, parsed));

        let status = match result {
            Ok(rows) => {
                log::debug!("[loader] {}: {rows} rows", def.file);
                self.source_lines
                    .insert(def.id, def.attribution.source_line());
                DatasetStatus {
                    id: def.id,
                    file: def.file.clone(),
                    loaded: true,
                    optional: def.optional,
                    rows,
                    error: None,
                }
            }
            Err(e) => {
                if def.optional {
                    log::info!("[loader] Optional dataset {} not available: {e}", def.file);
                } else {
                    log::error!("[loader] Failed to load {}: {e}", def.file);
                }
                DatasetStatus {
                    id: def.id,
                    file: def.file.clone(),
                    loaded: false,
                    optional: def.optional,
                    rows: 0,
                    error: Some(e.to_string()),
                }
            }
        };

        self.statuses.push(status);
    }

    fn store(&mut self, id: DatasetId, parsed: Parsed) -> Result<usize, SourceError> {
        match parsed {
            Parsed::Table(rows) => {
                if id == DatasetId::Population {
                    self.population = population_table(&rows);
                }
                let count = rows.len();
                self.tables.insert(id, rows);
                Ok(count)
            }
            Parsed::Features(features) => {
                let count = features.len();
                self.features.insert(id, features);
                Ok(count)
            }
            Parsed::Json(value) => match id {
                DatasetId::Spillover => {
                    self.spillover = serde_json::from_value(value)?;
                    Ok(self.spillover.states().count())
                }
                DatasetId::BorderIndex => {
                    self.border_index = serde_json::from_value(value)?;
                    Ok(self.border_index.estados.values().map(Vec::len).sum())
                }
                DatasetId::AgeComposition => {
                    self.age_composition = serde_json::from_value(value)?;
                    Ok(self.age_composition.subtypes().count())
                }
                other => Err(SourceError::Normalization {
                    message: format!("no JSON shape registered for dataset {other}"),
                }),
            },
        }
    }

    /// Rows of a tabular dataset; empty when it did not load.
    #[must_use]
    pub fn table(&self, id: DatasetId) -> &[CrimeRecord] {
        self.tables.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Features of a `GeoJSON` dataset; empty when it did not load.
    #[must_use]
    pub fn features(&self, id: DatasetId) -> &[GeoFeature] {
        self.features.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Whether a dataset loaded successfully.
    #[must_use]
    pub fn is_loaded(&self, id: DatasetId) -> bool {
        self.tables.contains_key(&id)
            || self.features.contains_key(&id)
            || self.statuses.iter().any(|s| s.id == id && s.loaded)
    }

    /// Footer line crediting a dataset's publisher.
    #[must_use]
    pub fn source_line(&self, id: DatasetId) -> String {
        self.source_lines
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "Fuente: SESNSP.".to_owned())
    }

    /// Inserts a table directly, bypassing the loader.
    pub fn insert_table(&mut self, id: DatasetId, rows: Vec<CrimeRecord>) {
        if id == DatasetId::Population {
            self.population = population_table(&rows);
        }
        self.tables.insert(id, rows);
    }

    /// Inserts features directly, bypassing the loader.
    pub fn insert_features(&mut self, id: DatasetId, features: Vec<GeoFeature>) {
        self.features.insert(id, features);
    }

    /// Datasets that were required but failed to load.
    pub fn missing(&self) -> impl Iterator<Item = &DatasetStatus> {
        self.statuses.iter().filter(|s| !s.loaded && !s.optional)
    }
}

async fn load_one(source: &dyn DataSource, def: &DatasetDefinition) -> Result<Parsed, SourceError> {
    let text = source.read_text(&def.file).await?;

    Ok(match def.format {
        DatasetFormat::Csv => Parsed::Table(parse_csv(&text)?),
        DatasetFormat::QuotedCsv => Parsed::Table(parse_quoted_csv(&text)?),
        DatasetFormat::GeoJson => Parsed::Features(features::parse_features(&text)?),
        DatasetFormat::Json => Parsed::Json(serde_json::from_str(&text)?),
    })
}
