//! Writing section documents and the run manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sinaloa_report_source::{DatasetStatus, ReportData};

use crate::GenerateError;
use crate::view::Section;

/// Bumped when the section document layout changes.
pub const MANIFEST_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";

/// What one run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// Written sections keyed by name.
    pub sections: BTreeMap<String, SectionEntry>,
    /// Sections that failed to build, with the error.
    pub failures: BTreeMap<String, String>,
    /// Load outcome of every dataset.
    pub datasets: Vec<DatasetStatus>,
    /// Required datasets that did not load.
    pub missing: Vec<String>,
}

/// Manifest entry for one written section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionEntry {
    pub title: String,
    pub file: String,
    pub charts: usize,
    pub tables: usize,
    pub maps: usize,
}

impl Manifest {
    #[must_use]
    pub fn new(data: &ReportData) -> Self {
        Self {
            version: MANIFEST_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            sections: BTreeMap::new(),
            failures: BTreeMap::new(),
            datasets: data.statuses.clone(),
            missing: data.missing().map(|s| s.file.clone()).collect(),
        }
    }

    /// Records a written section.
    pub fn record(&mut self, section: &Section, file: &Path) {
        let file = file
            .file_name()
            .map_or_else(|| file.display().to_string(), |f| f.to_string_lossy().into_owned());
        self.sections.insert(
            section.name.clone(),
            SectionEntry {
                title: section.title.clone(),
                file,
                charts: section.charts.len(),
                tables: section.tables.len(),
                maps: section.maps.len(),
            },
        );
    }

    /// Records a section that could not be built.
    pub fn record_failure(&mut self, name: &str, error: &GenerateError) {
        self.failures.insert(name.to_string(), error.to_string());
    }
}

/// Writes `<dir>/<section>.json` and returns its path.
///
/// # Errors
///
/// Returns an error if the section cannot be serialized or written.
pub fn write_section(dir: &Path, section: &Section) -> Result<PathBuf, GenerateError> {
    let path = dir.join(format!("{}.json", section.name));
    write_atomic(&path, &serde_json::to_string_pretty(section)?)?;
    log::info!(
        "Wrote {} ({} charts, {} tables, {} maps)",
        path.display(),
        section.charts.len(),
        section.tables.len(),
        section.maps.len()
    );
    Ok(path)
}

/// Writes `manifest.json`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be serialized or written.
pub fn save_manifest(dir: &Path, manifest: &Manifest) -> Result<(), GenerateError> {
    let path = dir.join(MANIFEST_FILE);
    write_atomic(&path, &serde_json::to_string_pretty(manifest)?)?;
    log::info!("Saved manifest to {}", path.display());
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), GenerateError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{TableCell, TableModel};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sinaloa_output_{name}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_section_json_without_leftover_tmp() {
        let dir = temp_dir("section");
        let mut section = Section::new("age", "Edad de las víctimas");
        let mut table = TableModel::new("age_table", "Edad", vec!["Mes".to_string()]);
        table.push_row(vec![TableCell::text("Enero 2024")], false);
        section.tables.push(table);

        let path = write_section(&dir, &section).unwrap();
        assert_eq!(path, dir.join("age.json"));
        assert!(!dir.join("age.json.tmp").exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["title"], "Edad de las víctimas");
        assert_eq!(written["tables"][0]["rows"][0][0]["text"], "Enero 2024");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn manifest_records_sections_and_failures() {
        let dir = temp_dir("manifest");
        let mut manifest = Manifest::new(&ReportData::default());
        let section = Section::new("national", "Nacional");
        manifest.record(&section, &dir.join("national.json"));
        manifest.record_failure(
            "war",
            &GenerateError::Config {
                message: "sin datos".to_string(),
            },
        );
        save_manifest(&dir, &manifest).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(written["version"], MANIFEST_VERSION);
        assert_eq!(written["sections"]["national"]["file"], "national.json");
        assert!(
            written["failures"]["war"]
                .as_str()
                .unwrap()
                .contains("sin datos")
        );
        assert!(written["generatedAt"].is_string());

        std::fs::remove_dir_all(&dir).ok();
    }
}
