//! Report configuration.
//!
//! The default configuration (`report.toml` at the crate root) is embedded
//! at compile time. A different file can be supplied with `--config`, and
//! individual CLI flags override single values on top of either.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sinaloa_report_analytics::ranking::DEFAULT_TOP_N;
use sinaloa_report_analytics_models::NormalizationBasis;
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_geography_models::normalize_name;
use sinaloa_report_source::DatasetId;

use crate::GenerateError;

/// The embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../report.toml");

/// Everything that shapes one report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where the input files live.
    pub data: DataConfig,
    /// Where the section documents are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Presentation knobs shared by several sections.
    #[serde(default)]
    pub report: ReportOptions,
    /// Maximum used to color each map.
    #[serde(default)]
    pub normalization: NormalizationConfig,
    /// One profile section per entry.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

/// Input location. `base_url` wins over `dir` when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Local directory holding the datasets.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Base URL the datasets are fetched from.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Output location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for section documents. Relative to the workspace root
    /// when not absolute; [`crate::output_dir`] when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Presentation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Rows per ranking table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Entity flagged in ranking tables.
    #[serde(default = "default_highlight")]
    pub highlight: String,
    /// Crime column selected on maps and rankings.
    #[serde(default = "default_crime")]
    pub crime: CrimeType,
    /// How many states the monthly-change chart shows.
    #[serde(default = "default_variable_states")]
    pub variable_states: usize,
    /// States favored when picking the most variable ones.
    #[serde(default)]
    pub featured_states: Vec<String>,
    /// States always shown on the monthly-change chart.
    #[serde(default)]
    pub required_states: Vec<String>,
    /// Subtype shown by the age section.
    #[serde(default = "default_age_subtype")]
    pub age_subtype: String,
    /// Shade Sinaloa on the spillover map by fixed case-count thresholds
    /// instead of the normalized ladder.
    #[serde(default)]
    pub spillover_absolute: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            highlight: default_highlight(),
            crime: default_crime(),
            variable_states: default_variable_states(),
            featured_states: Vec::new(),
            required_states: Vec::new(),
            age_subtype: default_age_subtype(),
            spillover_absolute: false,
        }
    }
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_highlight() -> String {
    "Sinaloa".to_string()
}

const fn default_crime() -> CrimeType {
    CrimeType::HomicidioDoloso
}

const fn default_variable_states() -> usize {
    8
}

fn default_age_subtype() -> String {
    sinaloa_report_analytics::age::DEFAULT_SUBTYPE.to_string()
}

/// Normalization basis per map.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Municipal polygon choropleth.
    #[serde(default)]
    pub choropleth: NormalizationBasis,
    /// Sinaloa heatmap polygons.
    #[serde(default)]
    pub heatmap: NormalizationBasis,
    /// Municipal circle markers.
    #[serde(default)]
    pub municipal: NormalizationBasis,
    /// Sinaloa polygons on the spillover map.
    #[serde(default)]
    pub spillover: NormalizationBasis,
}

/// A municipality profile: one chart, one value table and one comparison
/// table built from a subtype dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Municipality name as written in the dataset.
    pub municipality: String,
    /// Dataset with one column per subtype.
    #[serde(default = "default_profile_dataset")]
    pub dataset: DatasetId,
    /// Series to show, in order. Empty picks the largest increases.
    #[serde(default)]
    pub subtypes: Vec<String>,
    /// Series colors, cycled when shorter than the series list.
    #[serde(default)]
    pub palette: Vec<String>,
}

const fn default_profile_dataset() -> DatasetId {
    DatasetId::SinaloaMunicipalSubtypes
}

impl ProfileConfig {
    /// Section name, e.g. `profile_culiacan`.
    #[must_use]
    pub fn section_name(&self) -> String {
        format!(
            "profile_{}",
            normalize_name(&self.municipality).replace(' ', "_")
        )
    }
}

impl ReportConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Toml`] if the text is not a valid
    /// configuration, or [`GenerateError::Config`] if it is internally
    /// inconsistent.
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded file is invalid.
    pub fn embedded() -> Result<Self, GenerateError> {
        Self::parse(DEFAULT_CONFIG)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, GenerateError> {
        log::info!("Loading report config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// `--config` when given, otherwise the embedded default.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, GenerateError> {
        path.map_or_else(Self::embedded, Self::from_path)
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if self.report.top_n == 0 {
            return Err(GenerateError::Config {
                message: "report.top_n must be at least 1".to_string(),
            });
        }
        let mut names: Vec<String> = self.profiles.iter().map(ProfileConfig::section_name).collect();
        names.sort();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GenerateError::Config {
                message: format!("duplicate municipality profile '{}'", pair[0]),
            });
        }
        Ok(())
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.data_dir {
            self.data.dir = Some(dir);
            self.data.base_url = None;
        }
        if let Some(url) = overrides.base_url {
            self.data.base_url = Some(url);
        }
        if let Some(dir) = overrides.output {
            self.output.dir = Some(dir);
        }
        if let Some(top_n) = overrides.top_n.filter(|n| *n > 0) {
            self.report.top_n = top_n;
        }
        if let Some(crime) = overrides.crime {
            self.report.crime = crime;
        }
    }

    /// Looks up a profile by its section name.
    #[must_use]
    pub fn profile(&self, section: &str) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.section_name() == section)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub crime: Option<CrimeType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_parses() {
        let config = ReportConfig::embedded().unwrap();
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.report.crime, CrimeType::HomicidioDoloso);
        assert_eq!(config.normalization.heatmap, NormalizationBasis::GlobalMax);
        assert_eq!(config.normalization.choropleth, NormalizationBasis::PeriodMax);
        assert!(config.report.required_states.iter().any(|s| s == "Sinaloa"));
        assert_eq!(config.profiles.len(), 6);
        assert_eq!(config.profiles[0].dataset, DatasetId::SinaloaMunicipalSubtypes);
    }

    #[test]
    fn profile_section_names_are_ascii() {
        let config = ReportConfig::embedded().unwrap();
        let names: Vec<String> = config.profiles.iter().map(ProfileConfig::section_name).collect();
        assert!(names.contains(&"profile_culiacan".to_string()));
        assert!(names.contains(&"profile_cosala".to_string()));
        assert!(config.profile("profile_elota").unwrap().subtypes.is_empty());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ReportConfig::parse("[data]\ndir = \"datos\"\n").unwrap();
        assert_eq!(config.data.dir, Some(PathBuf::from("datos")));
        assert_eq!(config.report.highlight, "Sinaloa");
        assert_eq!(config.report.top_n, DEFAULT_TOP_N);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn rejects_duplicate_profiles() {
        let result = ReportConfig::parse(
            r#"
            [data]
            [[profiles]]
            municipality = "Culiacán"
            [[profiles]]
            municipality = "CULIACAN"
            "#,
        );
        assert!(matches!(result, Err(GenerateError::Config { .. })));
    }

    #[test]
    fn rejects_zero_top_n() {
        let result = ReportConfig::parse("[data]\n[report]\ntop_n = 0\n");
        assert!(matches!(result, Err(GenerateError::Config { .. })));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ReportConfig::embedded().unwrap();
        config.data.base_url = Some("https://example.org/".to_string());
        config.apply(Overrides {
            data_dir: Some(PathBuf::from("/tmp/datos")),
            top_n: Some(5),
            crime: Some(CrimeType::Feminicidio),
            ..Overrides::default()
        });
        assert_eq!(config.data.dir, Some(PathBuf::from("/tmp/datos")));
        assert!(config.data.base_url.is_none());
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.crime, CrimeType::Feminicidio);

        config.apply(Overrides {
            top_n: Some(0),
            ..Overrides::default()
        });
        assert_eq!(config.report.top_n, 5);
    }

    #[test]
    fn rejects_unknown_crime() {
        let result = ReportConfig::parse("[data]\n[report]\ncrime = \"robo\"\n");
        assert!(matches!(result, Err(GenerateError::Toml(_))));
    }
}
