//! Victim age composition in Sinaloa.

use std::collections::BTreeMap;

use sinaloa_report_analytics::age::{DEFAULT_SUBTYPE, age_composition};
use sinaloa_report_crime_models::AgeRange;
use sinaloa_report_source::DatasetId;

use super::ReportContext;
use crate::GenerateError;
use crate::view::{ChartConfig, ChartDataset, ChartKind, Section, TableCell, TableModel, format_count};

/// # Errors
///
/// Returns an error if a metric cannot be serialized.
pub fn build(ctx: &ReportContext<'_>, section: &mut Section) -> Result<(), GenerateError> {
    let data = &ctx.data.age_composition;
    let configured = ctx.config.report.age_subtype.as_str();
    let subtype = if data.subtypes().any(|s| s == configured) {
        configured
    } else {
        log::warn!("Age subtype '{configured}' not found, using '{DEFAULT_SUBTYPE}'");
        DEFAULT_SUBTYPE
    };

    let months = age_composition(data, subtype);
    if months.is_empty() {
        return Ok(());
    }
    let labels: Vec<String> = months.iter().map(|m| m.period.clone()).collect();

    let mut chart = ChartConfig::new(
        "age_composition",
        ChartKind::Bar,
        format!("Composición por edad de víctimas de {subtype} en Sinaloa"),
        labels,
    )
    .with_y_axis("Número de víctimas");
    for (index, range) in AgeRange::all().iter().enumerate() {
        chart = chart.with_dataset(ChartDataset::new(
            range.label(),
            months.iter().map(|m| m.shares[index].count).collect(),
            range.color(),
        ));
    }
    section.charts.push(chart);

    let mut table = TableModel::new(
        "age_composition_table",
        format!("Víctimas de {subtype} por rango de edad"),
        std::iter::once("Mes")
            .chain(AgeRange::all().iter().map(|r| r.label()))
            .chain(std::iter::once("Total"))
            .map(str::to_string)
            .collect(),
    )
    .with_source(ctx.data.source_line(DatasetId::AgeComposition));
    for month in &months {
        let cells = std::iter::once(TableCell::text(&month.period))
            .chain(month.shares.iter().map(|share| {
                TableCell::text(format!(
                    "{} ({:.1}%)",
                    format_count(share.count),
                    share.percentage
                ))
            }))
            .chain(std::iter::once(TableCell::count(month.total)))
            .collect();
        table.push_row(cells, false);
    }
    section.tables.push(table);

    let all: BTreeMap<&str, _> = data
        .subtypes()
        .map(|s| (s, age_composition(data, s)))
        .collect();
    section.metric("subtype", &subtype)?;
    section.metric("compositions", &all)?;
    Ok(())
}
