#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset ingestion for the Sinaloa homicide report.
//!
//! Datasets are described by embedded TOML configs ([`registry`]), read
//! through a [`DataSource`] (a local directory or an HTTP base URL) and
//! parsed into [`sinaloa_report_source_models`] types. [`ReportData`] is the
//! single owner of everything loaded: it is awaited once, then borrowed by
//! every report section.

pub mod dataset_def;
pub mod features;
pub mod fetch;
pub mod loader;
pub mod parsing;
pub mod progress;
pub mod registry;

pub use dataset_def::{DatasetDefinition, DatasetId};
pub use fetch::{DataSource, HttpSource, LocalDirSource};
pub use loader::{DatasetStatus, ReportData};

/// Errors that can occur while reading or parsing a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No dataset is registered under the requested id.
    #[error("Unknown dataset: {id}")]
    UnknownDataset {
        /// The requested id.
        id: String,
    },

    /// The file parsed but did not have the expected shape.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}
