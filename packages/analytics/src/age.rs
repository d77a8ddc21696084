//! Victim age composition per month.

use sinaloa_report_analytics_models::{AgeCompositionMonth, AgeShare};
use sinaloa_report_crime_models::AgeRange;
use sinaloa_report_source_models::AgeCompositionData;

use crate::metrics::round_to;

/// Subtype shown when none is selected.
pub const DEFAULT_SUBTYPE: &str = "Homicidio doloso";

/// Month-by-month age breakdown of `subtype`, oldest month first.
///
/// An unknown subtype yields no months.
#[must_use]
pub fn age_composition(data: &AgeCompositionData, subtype: &str) -> Vec<AgeCompositionMonth> {
    let periods = data.periods(subtype);
    if periods.is_empty() {
        log::warn!("No age composition recorded for '{subtype}'");
    }

    periods
        .into_iter()
        .map(|period| {
            let counts: Vec<(AgeRange, f64)> = AgeRange::all()
                .iter()
                .map(|&range| (range, data.count(subtype, period, range)))
                .collect();
            let total: f64 = counts.iter().map(|(_, count)| count).sum();

            AgeCompositionMonth {
                period: period.to_string(),
                total,
                shares: counts
                    .into_iter()
                    .map(|(range, count)| AgeShare {
                        range,
                        count,
                        percentage: if total > 0.0 {
                            round_to(count / total * 100.0, 2)
                        } else {
                            0.0
                        },
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::approx;

    fn data() -> AgeCompositionData {
        serde_json::from_str(
            r#"{
                "Homicidio doloso": {
                    "Febrero 2024": {
                        "Menores de edad (0-17)": 1,
                        "Adultos (18 y más)": 2
                    },
                    "Enero 2024": {
                        "Menores de edad (0-17)": 5,
                        "Adultos (18 y más)": 90,
                        "No especificado": 3,
                        "No identificado": 2
                    },
                    "Marzo 2024": {}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn months_are_chronological_with_one_share_per_range() {
        let months = age_composition(&data(), DEFAULT_SUBTYPE);
        let labels: Vec<_> = months.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(labels, vec!["Enero 2024", "Febrero 2024", "Marzo 2024"]);
        assert!(months.iter().all(|m| m.shares.len() == AgeRange::all().len()));

        let enero = &months[0];
        assert!(approx(enero.total, 100.0));
        assert!(approx(enero.shares[1].percentage, 90.0));
        assert_eq!(enero.shares[1].range, AgeRange::Adults);
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let months = age_composition(&data(), DEFAULT_SUBTYPE);
        let febrero = &months[1];
        assert!(approx(febrero.shares[0].percentage, 33.33));
        assert!(approx(febrero.shares[1].percentage, 66.67));
        assert!(approx(febrero.shares[2].count, 0.0));
    }

    #[test]
    fn empty_month_has_zero_percentages() {
        let months = age_composition(&data(), DEFAULT_SUBTYPE);
        let marzo = &months[2];
        assert!(approx(marzo.total, 0.0));
        assert!(marzo.shares.iter().all(|s| approx(s.percentage, 0.0)));
    }

    #[test]
    fn unknown_subtype_is_empty() {
        assert!(age_composition(&data(), "Secuestro").is_empty());
    }
}
