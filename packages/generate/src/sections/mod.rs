//! Report section builders.
//!
//! Each section turns the loaded [`ReportData`] into one [`Section`] of
//! charts, tables and maps. Sections never depend on each other: a section
//! whose datasets failed to load still produces a document (possibly
//! empty) and the others are unaffected.

pub mod age;
mod annual;
pub mod heatmap;
pub mod municipal;
pub mod national;
pub mod profile;
pub mod regional;
pub mod sinaloa;
pub mod spillover;
pub mod state_ranking;
pub mod war;

use sinaloa_report_analytics::war::WAR_BREAK_INDEX;
use sinaloa_report_analytics_models::{ChangeRow, RankingTable};
use sinaloa_report_crime_models::{CrimeType, Period};
use sinaloa_report_geography_models::names_match;
use sinaloa_report_source::{DatasetId, ReportData};
use sinaloa_report_source_models::GeoFeature;
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::GenerateError;
use crate::config::ReportConfig;
use crate::view::{Section, TableCell, TableModel, VerticalMarker};

/// Everything a section builder reads.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub data: &'a ReportData,
    pub config: &'a ReportConfig,
}

impl<'a> ReportContext<'a> {
    #[must_use]
    pub const fn new(data: &'a ReportData, config: &'a ReportConfig) -> Self {
        Self { data, config }
    }
}

/// The fixed report sections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum SectionId {
    National,
    StateRanking,
    Sinaloa,
    Municipal,
    Regional,
    Heatmap,
    Spillover,
    War,
    Age,
}

impl SectionId {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::National => "Violencia homicida a nivel nacional",
            Self::StateRanking => "Ranking estatal",
            Self::Sinaloa => "Violencia homicida en Sinaloa",
            Self::Municipal => "Municipios de Sinaloa",
            Self::Regional => "Análisis regional de Sinaloa",
            Self::Heatmap => "Mapa de calor de Sinaloa",
            Self::Spillover => "Efecto derrame en estados vecinos",
            Self::War => "Antes y después de septiembre de 2024",
            Self::Age => "Edad de las víctimas en Sinaloa",
        }
    }

    /// Datasets the section is built from.
    #[must_use]
    pub const fn datasets(self) -> &'static [DatasetId] {
        match self {
            Self::National => &[
                DatasetId::NationalAnnual,
                DatasetId::NationalMonthly,
                DatasetId::StateMonthly,
                DatasetId::StateDecember2023,
                DatasetId::Population,
            ],
            Self::StateRanking => &[
                DatasetId::StateMonthly,
                DatasetId::State2025,
                DatasetId::StateDecember2023,
                DatasetId::Population,
            ],
            Self::Sinaloa => &[
                DatasetId::SinaloaAnnual,
                DatasetId::SinaloaMonthly,
                DatasetId::StateDecember2023,
                DatasetId::Population,
            ],
            Self::Municipal | Self::Regional | Self::Heatmap => {
                &[DatasetId::SinaloaMunicipal, DatasetId::SinaloaGeojson]
            }
            Self::Spillover => &[
                DatasetId::Spillover,
                DatasetId::BorderMunicipal,
                DatasetId::BorderIndex,
                DatasetId::SinaloaMunicipal,
                DatasetId::SinaloaGeojson,
                DatasetId::SonoraGeojson,
                DatasetId::ChihuahuaGeojson,
                DatasetId::DurangoGeojson,
                DatasetId::NayaritGeojson,
            ],
            Self::War => &[
                DatasetId::SinaloaMunicipalSubtypes,
                DatasetId::SinaloaMonthly,
                DatasetId::AnomaliesReference,
            ],
            Self::Age => &[DatasetId::AgeComposition],
        }
    }
}

/// Fixed sections followed by one `profile_<municipality>` per profile.
#[must_use]
pub fn section_names(config: &ReportConfig) -> Vec<String> {
    SectionId::iter()
        .map(|id| id.to_string())
        .chain(config.profiles.iter().map(|p| p.section_name()))
        .collect()
}

/// Builds one section by name.
///
/// # Errors
///
/// Returns [`GenerateError::Config`] for an unknown name, or the error of
/// the section builder.
pub fn build(name: &str, ctx: &ReportContext<'_>) -> Result<Section, GenerateError> {
    if let Some(profile) = ctx.config.profile(name) {
        let mut section = Section::new(name, format!("Perfil de {}", profile.municipality));
        if gate(ctx.data, &mut section, &[profile.dataset])? {
            profile::build(ctx, profile, &mut section)?;
        }
        return Ok(section);
    }

    let id: SectionId = name.parse().map_err(|_| GenerateError::Config {
        message: format!("unknown section '{name}'"),
    })?;

    let mut section = Section::new(id.as_ref(), id.title());
    if !gate(ctx.data, &mut section, id.datasets())? {
        return Ok(section);
    }

    match id {
        SectionId::National => national::build(ctx, &mut section)?,
        SectionId::StateRanking => state_ranking::build(ctx, &mut section)?,
        SectionId::Sinaloa => sinaloa::build(ctx, &mut section)?,
        SectionId::Municipal => municipal::build(ctx, &mut section)?,
        SectionId::Regional => regional::build(ctx, &mut section)?,
        SectionId::Heatmap => heatmap::build(ctx, &mut section)?,
        SectionId::Spillover => spillover::build(ctx, &mut section)?,
        SectionId::War => war::build(ctx, &mut section)?,
        SectionId::Age => age::build(ctx, &mut section)?,
    }

    if section.is_empty() {
        log::warn!("Section {name} has nothing to show");
    }
    Ok(section)
}

/// Records missing inputs on the section. Returns `false` when none of
/// them loaded, in which case the section stays empty.
fn gate(
    data: &ReportData,
    section: &mut Section,
    datasets: &[DatasetId],
) -> Result<bool, GenerateError> {
    let missing: Vec<DatasetId> = datasets
        .iter()
        .copied()
        .filter(|&id| !data.is_loaded(id))
        .collect();

    if missing.is_empty() {
        return Ok(true);
    }

    let names: Vec<&str> = missing.iter().map(AsRef::as_ref).collect();
    log::error!(
        "Section {} is missing datasets: {}",
        section.name,
        names.join(", ")
    );
    section.metric("missingDatasets", &names)?;

    Ok(missing.len() < datasets.len())
}

/// Vertical rule marking the September 2024 break.
pub(crate) fn war_marker() -> VerticalMarker {
    VerticalMarker {
        at: Period::report_window()[WAR_BREAK_INDEX].to_string(),
        text: "Inicio Guerra".to_string(),
        color: "#dc3545".to_string(),
    }
}

/// The GeoJSON feature whose name matches `name`, ignoring accents.
pub(crate) fn find_feature<'a>(features: &'a [GeoFeature], name: &str) -> Option<&'a GeoFeature> {
    features.iter().find(|f| names_match(&f.name, name))
}

/// Headers for a per-crime table: the given leading columns followed by
/// every crime label.
pub(crate) fn crime_headers(leading: &[&str]) -> Vec<String> {
    leading
        .iter()
        .map(|h| (*h).to_string())
        .chain(CrimeType::all().iter().map(|c| c.label().to_string()))
        .collect()
}

/// A table of percent changes with one column per period.
pub(crate) fn change_table(id: &str, title: &str, first: &str, rows: &[ChangeRow]) -> TableModel {
    let periods: Vec<String> = rows
        .first()
        .map(|row| row.changes.iter().map(|c| c.period.clone()).collect())
        .unwrap_or_default();
    let headers = std::iter::once(first.to_string())
        .chain(periods.iter().cloned())
        .collect();

    let mut table = TableModel::new(id, title, headers);
    for row in rows {
        let cells = std::iter::once(TableCell::text(&row.label))
            .chain(row.changes.iter().map(|c| {
                TableCell::percent(c.value).with_class(change_class(c.value))
            }))
            .collect();
        table.push_row(cells, row.crime == Some(CrimeType::Total));
    }
    table
}

/// `increase`, `decrease` or `neutral`.
pub(crate) fn change_class(value: f64) -> &'static str {
    if value > 0.0 {
        "increase"
    } else if value < 0.0 {
        "decrease"
    } else {
        "neutral"
    }
}

/// One table per ranking, `decimals` digits per value.
pub(crate) fn ranking_table_models(
    prefix: &str,
    title: &str,
    rankings: &[RankingTable],
    decimals: usize,
    source: &str,
) -> Vec<TableModel> {
    rankings
        .iter()
        .enumerate()
        .map(|(index, ranking)| {
            let mut table = TableModel::new(
                &format!("{prefix}_{index}"),
                format!("{title} - {}", ranking.period),
                vec![
                    "#".to_string(),
                    "Estado".to_string(),
                    ranking.crime.label().to_string(),
                ],
            )
            .with_source(source);
            for entry in &ranking.entries {
                table.push_row(
                    vec![
                        TableCell::text(entry.rank.to_string()),
                        TableCell::text(&entry.name),
                        TableCell::decimal(entry.value, decimals),
                    ],
                    entry.highlighted,
                );
            }
            table
        })
        .collect()
}
