#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generates the Sinaloa homicide report as JSON view models.
//!
//! Datasets are loaded once into a [`ReportData`], then every requested
//! section is built from it independently: a section whose inputs are
//! missing, or whose builder fails, is logged and skipped without
//! affecting the others. Each section is written to
//! `<output>/<section>.json` and a `manifest.json` records what was
//! produced and which datasets were unavailable.

pub mod config;
pub mod interactive;
pub mod output;
pub mod sections;
pub mod view;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sinaloa_report_cli_utils::{IndicatifProgress, MultiProgress};
use sinaloa_report_source::progress::ProgressCallback;
use sinaloa_report_source::registry::all_datasets;
use sinaloa_report_source::{DataSource, HttpSource, LocalDirSource, ReportData, SourceError};

use crate::config::ReportConfig;
use crate::output::Manifest;
use crate::sections::ReportContext;

/// Errors that can occur while generating the report.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Dataset loading failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a section failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML for [`ReportConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration is inconsistent or names something unknown.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR` so relative paths
/// work regardless of the caller's working directory. Falls back to the
/// current directory when the crate is built outside the workspace.
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Default directory for generated section documents.
#[must_use]
pub fn output_dir() -> PathBuf {
    workspace_root().join("data/generated")
}

fn from_root(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root().join(path)
    }
}

/// The output directory a configuration asks for.
#[must_use]
pub fn resolve_output_dir(config: &ReportConfig) -> PathBuf {
    config
        .output
        .dir
        .as_deref()
        .map_or_else(output_dir, from_root)
}

/// The data source a configuration asks for: its base URL when set,
/// otherwise its data directory (default `data/`).
#[must_use]
pub fn data_source(config: &ReportConfig) -> Box<dyn DataSource> {
    if let Some(url) = &config.data.base_url {
        return Box::new(HttpSource::new(url));
    }
    let dir = config
        .data
        .dir
        .as_deref()
        .map_or_else(|| workspace_root().join("data"), from_root);
    Box::new(LocalDirSource::new(dir))
}

/// Loads every registered dataset from the configured source.
pub async fn load_data(config: &ReportConfig, progress: &Arc<dyn ProgressCallback>) -> ReportData {
    let source = data_source(config);
    ReportData::load(source.as_ref(), &all_datasets(), progress).await
}

/// Builds and writes the named sections, then the manifest.
///
/// A section that fails to build is logged and left out of the manifest;
/// only output I/O failures abort the run.
///
/// # Errors
///
/// Returns an error if the output directory or a file in it cannot be
/// written.
pub fn generate(
    ctx: &ReportContext<'_>,
    names: &[String],
    dir: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Manifest, GenerateError> {
    std::fs::create_dir_all(dir)?;
    progress.set_total(names.len() as u64);

    let mut manifest = Manifest::new(ctx.data);

    for name in names {
        progress.set_message(format!("Building {name}"));
        match sections::build(name, ctx) {
            Ok(section) => {
                let file = output::write_section(dir, &section)?;
                manifest.record(&section, &file);
            }
            Err(e) => {
                log::error!("Failed to build section {name}: {e}");
                manifest.record_failure(name, &e);
            }
        }
        progress.inc(1);
    }

    output::save_manifest(dir, &manifest)?;
    progress.finish(format!(
        "{}/{} sections written to {}",
        manifest.sections.len(),
        names.len(),
        dir.display()
    ));

    Ok(manifest)
}

/// Loads the datasets and writes the named sections, with one progress
/// bar for each phase.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub async fn run(
    config: &ReportConfig,
    names: &[String],
    multi: &MultiProgress,
) -> Result<Manifest, GenerateError> {
    let datasets = IndicatifProgress::datasets_bar(multi, "Loading datasets");
    let data = load_data(config, &datasets).await;

    let missing: Vec<&str> = data.missing().map(|s| s.file.as_str()).collect();
    if !missing.is_empty() {
        log::warn!("{} datasets unavailable: {}", missing.len(), missing.join(", "));
    }

    let ctx = ReportContext::new(&data, config);
    let dir = resolve_output_dir(config);
    let sections = IndicatifProgress::sections_bar(multi, "Sections", names.len() as u64);
    generate(&ctx, names, &dir, &sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_output_dirs_resolve_against_the_workspace() {
        let mut config = ReportConfig::embedded().unwrap();
        assert_eq!(resolve_output_dir(&config), workspace_root().join("data/generated"));

        config.output.dir = Some(PathBuf::from("/tmp/informe"));
        assert_eq!(resolve_output_dir(&config), PathBuf::from("/tmp/informe"));

        config.output.dir = None;
        assert_eq!(resolve_output_dir(&config), output_dir());
    }

    #[test]
    fn base_url_takes_precedence() {
        let mut config = ReportConfig::embedded().unwrap();
        config.data.base_url = Some("https://example.org/informe".to_string());
        assert_eq!(data_source(&config).describe(), "https://example.org/informe");

        config.data.base_url = None;
        config.data.dir = Some(PathBuf::from("/srv/datos"));
        assert_eq!(data_source(&config).describe(), "/srv/datos");
    }
}
