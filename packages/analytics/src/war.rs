//! The September 2024 structural break.
//!
//! Monthly series are aligned to the 19-month report window. Months 1-8
//! (Enero-Agosto 2024) are pre-war, months 9-19 (Septiembre 2024-Julio
//! 2025) post-war. Comparisons are derived from the subtype dataset at
//! runtime; a published comparison table, when available, is only checked
//! against them.

use sinaloa_report_analytics_models::{StaleFigure, WarComparison};
use sinaloa_report_crime_models::Period;
use sinaloa_report_geography_models::names_match;
use sinaloa_report_source_models::{CrimeRecord, parse_count};

use crate::metrics::{mean, percent_change};
use crate::monthly::PERIOD_COLUMN;
use crate::ranking::MUNICIPALITY_COLUMN;

/// Window index of the first post-war month (`Septiembre 2024`).
pub const WAR_BREAK_INDEX: usize = 8;

/// Changes above this percentage are anomalies.
pub const ANOMALY_THRESHOLD_PCT: f64 = 50.0;

/// Number of anomalies listed per municipality.
pub const ANOMALY_LIMIT: usize = 10;

/// Changes above this percentage are a significant increase.
pub const SIGNIFICANT_INCREASE_PCT: f64 = 20.0;

/// Published figures within this distance of the derived value agree.
pub const RECONCILE_TOLERANCE: f64 = 0.01;

/// A monthly series aligned to the report window.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    /// Entity the series belongs to.
    pub entity: String,
    /// Series label (crime subtype).
    pub series: String,
    /// One slot per window month; `None` where the dataset has no row.
    pub values: Vec<Option<f64>>,
}

impl MonthlySeries {
    /// Values with missing months as zero, for charts.
    #[must_use]
    pub fn dense(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(0.0)).collect()
    }
}

/// Position of `period` in the report window.
#[must_use]
pub fn window_index(period: Period) -> Option<usize> {
    Period::report_window().iter().position(|p| *p == period)
}

/// Subtype columns of the wide subtype dataset.
#[must_use]
pub fn subtype_columns(rows: &[CrimeRecord]) -> Vec<String> {
    rows.first()
        .map(|row| {
            row.headers()
                .filter(|h| *h != MUNICIPALITY_COLUMN && *h != PERIOD_COLUMN)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Every subtype series of one municipality.
#[must_use]
pub fn municipal_subtype_series(rows: &[CrimeRecord], municipality: &str) -> Vec<MonthlySeries> {
    let window_len = Period::report_window().len();
    let municipal_rows: Vec<(usize, &CrimeRecord)> = rows
        .iter()
        .filter(|row| names_match(row.text(MUNICIPALITY_COLUMN), municipality))
        .filter_map(|row| {
            let period = row.period()?;
            let Some(index) = window_index(period) else {
                log::debug!("{municipality}: {period} is outside the report window");
                return None;
            };
            Some((index, row))
        })
        .collect();

    subtype_columns(rows)
        .into_iter()
        .map(|series| {
            let mut values = vec![None; window_len];
            for (index, row) in &municipal_rows {
                values[*index] = Some(row.count(&series));
            }
            MonthlySeries {
                entity: municipality.to_owned(),
                series,
                values,
            }
        })
        .collect()
}

/// Pre/post-war comparison of a window-aligned series.
#[must_use]
pub fn compare(series: &MonthlySeries) -> WarComparison {
    let split = WAR_BREAK_INDEX.min(series.values.len());
    let (pre, post) = series.values.split_at(split);
    let pre: Vec<f64> = pre.iter().flatten().copied().collect();
    let post: Vec<f64> = post.iter().flatten().copied().collect();
    comparison(&series.entity, &series.series, &pre, &post)
}

/// Pre/post-war comparison of a series that starts at `Enero 2024`.
#[must_use]
pub fn compare_values(entity: &str, series: &str, values: &[f64]) -> WarComparison {
    let split = WAR_BREAK_INDEX.min(values.len());
    let (pre, post) = values.split_at(split);
    comparison(entity, series, pre, post)
}

fn comparison(entity: &str, series: &str, pre: &[f64], post: &[f64]) -> WarComparison {
    let pre_average = mean(pre);
    let post_average = mean(post);
    WarComparison {
        entity: entity.to_owned(),
        series: series.to_owned(),
        pre_average,
        post_average,
        percent_change: percent_change(post_average, pre_average),
        absolute_change: post_average - pre_average,
        pre_cases: pre.iter().sum(),
        post_cases: post.iter().sum(),
    }
}

/// Comparisons of every subtype of `municipality`, highest change first.
#[must_use]
pub fn municipal_comparisons(rows: &[CrimeRecord], municipality: &str) -> Vec<WarComparison> {
    let mut comparisons: Vec<WarComparison> = municipal_subtype_series(rows, municipality)
        .iter()
        .map(compare)
        .collect();
    comparisons.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));
    comparisons
}

/// Comparisons with a change above [`ANOMALY_THRESHOLD_PCT`], highest
/// first, at most [`ANOMALY_LIMIT`].
#[must_use]
pub fn anomalies(comparisons: &[WarComparison]) -> Vec<WarComparison> {
    let mut flagged: Vec<WarComparison> = comparisons
        .iter()
        .filter(|c| c.percent_change > ANOMALY_THRESHOLD_PCT)
        .cloned()
        .collect();
    flagged.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));
    flagged.truncate(ANOMALY_LIMIT);
    flagged
}

/// Whether a comparison is a significant increase.
#[must_use]
pub fn is_significant_increase(comparison: &WarComparison) -> bool {
    comparison.percent_change > SIGNIFICANT_INCREASE_PCT
}

fn derived_figures(c: &WarComparison) -> [(&'static str, f64); 5] {
    [
        ("Promedio_antes_sept", c.pre_average),
        ("Promedio_despues_sept", c.post_average),
        ("Cambio_porcentual", c.percent_change),
        ("Casos_antes_sept", c.pre_cases),
        ("Casos_despues_sept", c.post_cases),
    ]
}

/// Checks a published comparison table against derived comparisons.
///
/// Every published figure that differs from its derived counterpart by
/// more than [`RECONCILE_TOLERANCE`] is returned as possibly stale. The
/// published values are reported as-is; nothing is corrected.
#[must_use]
pub fn reconcile_published(published: &[CrimeRecord], derived: &[WarComparison]) -> Vec<StaleFigure> {
    let mut stale = Vec::new();

    for row in published {
        let entity = row.text(MUNICIPALITY_COLUMN);
        let series = row.text("Subtipo_delito");
        let Some(comparison) = derived
            .iter()
            .find(|c| names_match(&c.entity, entity) && c.series == series)
        else {
            log::debug!("No derived comparison for published row {entity} / {series}");
            continue;
        };

        for (field, derived_value) in derived_figures(comparison) {
            let Some(text) = row.get(field) else {
                continue;
            };
            let published_value = parse_count(text);
            if (published_value - derived_value).abs() > RECONCILE_TOLERANCE {
                log::warn!(
                    "Published {field} for {entity} / {series} is {published_value}, derived {derived_value:.2}"
                );
                stale.push(StaleFigure {
                    entity: entity.to_owned(),
                    series: series.to_owned(),
                    field: field.to_owned(),
                    published: published_value,
                    derived: derived_value,
                });
            }
        }
    }

    stale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::approx;

    const CULIACAN_DOLOSO: [f64; 19] = [
        36.0, 25.0, 19.0, 20.0, 23.0, 23.0, 23.0, 21.0, 65.0, 107.0, 99.0, 69.0, 71.0, 73.0, 68.0,
        62.0, 77.0, 100.0, 89.0,
    ];

    #[test]
    fn culiacan_homicide_comparison() {
        let c = compare_values("Culiacán", "Homicidio doloso", &CULIACAN_DOLOSO);
        assert!(approx(c.pre_average, 23.75));
        assert!(approx(c.post_average, 80.0));
        assert!((c.percent_change - 236.84).abs() < 0.01);
        assert!(approx(c.absolute_change, 56.25));
        assert!(approx(c.pre_cases, 190.0));
        assert!(approx(c.post_cases, 880.0));
    }

    #[test]
    fn zero_pre_war_average_reports_no_change() {
        let mut values = vec![0.0; 8];
        values.extend([3.0; 11]);
        let c = compare_values("Cosalá", "Feminicidio", &values);
        assert!(approx(c.percent_change, 0.0));
        assert!(approx(c.post_average, 3.0));
    }

    #[test]
    fn short_series_average_over_present_months() {
        let c = compare_values("Elota", "Robo", &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 20.0]);
        assert!(approx(c.pre_average, 9.0));
        assert!(approx(c.post_average, 20.0));
    }

    fn subtype_rows() -> Vec<CrimeRecord> {
        let mut rows = Vec::new();
        for (index, period) in Period::report_window().iter().enumerate() {
            let label = period.to_string();
            let doloso = CULIACAN_DOLOSO[index].to_string();
            let robo = if index < 8 { "10" } else { "11" };
            rows.push(CrimeRecord::from_pairs(&[
                ("Municipio", "Culiacán"),
                ("Periodo", label.as_str()),
                ("Homicidio doloso", doloso.as_str()),
                ("Robo a negocio", robo),
            ]));
        }
        rows.push(CrimeRecord::from_pairs(&[
            ("Municipio", "Culiacán"),
            ("Periodo", "Agosto 2025"),
            ("Homicidio doloso", "500"),
            ("Robo a negocio", "500"),
        ]));
        rows
    }

    #[test]
    fn series_are_derived_from_the_subtype_dataset() {
        let rows = subtype_rows();
        assert_eq!(subtype_columns(&rows), vec!["Homicidio doloso", "Robo a negocio"]);

        let comparisons = municipal_comparisons(&rows, "culiacan");
        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0].series, "Homicidio doloso");
        assert!(approx(comparisons[0].post_average, 80.0));
        assert!(approx(comparisons[1].percent_change, 10.0));
    }

    #[test]
    fn missing_months_are_skipped_not_zeroed() {
        let rows: Vec<CrimeRecord> = subtype_rows()
            .into_iter()
            .filter(|row| row.text("Periodo") != "Enero 2024")
            .collect();
        let series = municipal_subtype_series(&rows, "Culiacán");
        assert_eq!(series[0].values[0], None);
        assert_eq!(series[0].dense()[0], 0.0);
        let c = compare(&series[0]);
        assert!(approx(c.pre_average, 154.0 / 7.0));
    }

    #[test]
    fn anomalies_keep_top_ten_above_fifty_percent() {
        let comparisons: Vec<WarComparison> = (0..14)
            .map(|i| {
                let post = f64::from(i).mul_add(2.0, 10.0);
                comparison("Culiacán", &format!("S{i}"), &[10.0], &[post])
            })
            .collect();

        let flagged = anomalies(&comparisons);
        assert_eq!(flagged.len(), 10);
        assert!(flagged.iter().all(|c| c.percent_change > ANOMALY_THRESHOLD_PCT));
        assert!(flagged.windows(2).all(|w| w[0].percent_change >= w[1].percent_change));
        assert_eq!(flagged[0].series, "S13");
    }

    #[test]
    fn significant_increase_benchmark() {
        let c = compare_values("Navolato", "Robo", &[10.0; 8]);
        assert!(!is_significant_increase(&c));
        let mut values = vec![10.0; 8];
        values.push(12.5);
        assert!(is_significant_increase(&compare_values("Navolato", "Robo", &values)));
    }

    #[test]
    fn reconciliation_flags_disagreeing_figures() {
        let derived = vec![compare_values("Culiacán", "Homicidio doloso", &CULIACAN_DOLOSO)];
        let published = vec![
            CrimeRecord::from_pairs(&[
                ("Municipio", "Culiacán"),
                ("Subtipo_delito", "Homicidio doloso"),
                ("Promedio_antes_sept", "23.75"),
                ("Promedio_despues_sept", "78.5"),
                ("Cambio_porcentual", "236.84"),
                ("Casos_antes_sept", "190"),
                ("Casos_despues_sept", "880"),
            ]),
            CrimeRecord::from_pairs(&[
                ("Municipio", "Navolato"),
                ("Subtipo_delito", "Homicidio doloso"),
                ("Cambio_porcentual", "999"),
            ]),
        ];

        let stale = reconcile_published(&published, &derived);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].field, "Promedio_despues_sept");
        assert!(approx(stale[0].published, 78.5));
        assert!(approx(stale[0].derived, 80.0));
    }

    #[test]
    fn reconciliation_flags_small_average_gaps() {
        let derived = vec![compare_values("Culiacán", "Homicidio doloso", &CULIACAN_DOLOSO)];
        let published = vec![CrimeRecord::from_pairs(&[
            ("Municipio", "Culiacan"),
            ("Subtipo_delito", "Homicidio doloso"),
            ("Promedio_antes_sept", "23.77"),
            ("Promedio_despues_sept", "80.005"),
        ])];

        let stale = reconcile_published(&published, &derived);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].field, "Promedio_antes_sept");
        assert!(approx(stale[0].derived, 23.75));
    }
}
