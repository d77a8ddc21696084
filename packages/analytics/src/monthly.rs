//! Month-over-month changes.
//!
//! The first period of a monthly series is only compared when it is
//! `Enero 2024`, against a December 2023 baseline; any other first period
//! reports no change.

use sinaloa_report_analytics_models::{ChangeRow, CrimeValues, PeriodValue};
use sinaloa_report_crime_models::{CrimeType, Month, Period};
use sinaloa_report_geography_models::names_match;
use sinaloa_report_source_models::CrimeRecord;

use crate::annual::TOTAL_ROW_LABEL;
use crate::metrics::{mean, percent_change};

/// Column holding the period label in monthly datasets.
pub const PERIOD_COLUMN: &str = "Periodo";

/// Column holding the state name in state-level datasets.
pub const STATE_COLUMN: &str = "Estado";

/// National December 2023 counts, used when the December 2023 state
/// dataset is not available.
pub const DEFAULT_DECEMBER_2023_BASELINE: [(CrimeType, f64); 5] = [
    (CrimeType::HomicidioDoloso, 1994.0),
    (CrimeType::HomicidioCulposo, 1581.0),
    (CrimeType::Feminicidio, 61.0),
    (CrimeType::OtrosDelitos, 1105.0),
    (CrimeType::Total, 4741.0),
];

const BASELINE_PERIOD: Period = Period::month(Month::Enero, 2024);

/// The default December 2023 baseline as [`CrimeValues`].
#[must_use]
pub fn default_baseline() -> CrimeValues {
    DEFAULT_DECEMBER_2023_BASELINE.into_iter().collect()
}

/// Sums every row of the December 2023 state dataset into a national
/// baseline. Falls back to [`default_baseline`] when `rows` is empty.
#[must_use]
pub fn december_baseline(rows: &[CrimeRecord]) -> CrimeValues {
    if rows.is_empty() {
        log::debug!("December 2023 dataset unavailable, using published national baseline");
        return default_baseline();
    }
    sum_rows(rows.iter())
}

/// Sums each crime column over `rows`.
pub fn sum_rows<'a>(rows: impl Iterator<Item = &'a CrimeRecord>) -> CrimeValues {
    let mut totals: CrimeValues = CrimeType::all().iter().map(|&c| (c, 0.0)).collect();
    for row in rows {
        for (&crime, total) in &mut totals {
            *total += row.crime(crime);
        }
    }
    totals
}

/// Distinct values of `Periodo`, in first-seen order.
#[must_use]
pub fn unique_periods(rows: &[CrimeRecord]) -> Vec<String> {
    let mut periods: Vec<String> = Vec::new();
    for row in rows {
        let period = row.text(PERIOD_COLUMN);
        if !period.is_empty() && !periods.iter().any(|p| p == period) {
            periods.push(period.to_owned());
        }
    }
    periods
}

fn is_baseline_period(label: &str) -> bool {
    label.parse::<Period>().is_ok_and(|p| p == BASELINE_PERIOD)
}

/// Percent change of each value against the previous one.
///
/// `baseline` is the value before the first period; it is only used when
/// the first period is `Enero 2024`.
#[must_use]
pub fn sequential_changes(
    periods: &[String],
    values: &[f64],
    baseline: Option<f64>,
) -> Vec<PeriodValue> {
    periods
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (period, &value))| {
            let change = if index == 0 {
                match baseline {
                    Some(prior) if is_baseline_period(period) => percent_change(value, prior),
                    _ => 0.0,
                }
            } else {
                percent_change(value, values[index - 1])
            };
            PeriodValue {
                period: period.clone(),
                value: change,
            }
        })
        .collect()
}

/// Month-over-month changes of a monthly series with one row per period:
/// one row per component crime, then the totals row from `Total`.
#[must_use]
pub fn month_over_month_changes(rows: &[CrimeRecord], baseline: &CrimeValues) -> Vec<ChangeRow> {
    let periods: Vec<String> = rows
        .iter()
        .map(|row| row.text(PERIOD_COLUMN).to_owned())
        .collect();

    CrimeType::all()
        .iter()
        .map(|&crime| {
            let values: Vec<f64> = rows.iter().map(|row| row.crime(crime)).collect();
            let label = if crime == CrimeType::Total {
                TOTAL_ROW_LABEL.to_owned()
            } else {
                crime.label().to_owned()
            };
            ChangeRow {
                label,
                crime: Some(crime),
                changes: sequential_changes(&periods, &values, baseline.get(&crime).copied()),
            }
        })
        .collect()
}

/// National total of one crime column per period, summing every state row.
#[must_use]
pub fn national_monthly_totals(rows: &[CrimeRecord], crime: CrimeType) -> Vec<PeriodValue> {
    unique_periods(rows)
        .into_iter()
        .map(|period| {
            let value = rows
                .iter()
                .filter(|row| row.text(PERIOD_COLUMN) == period)
                .map(|row| row.crime(crime))
                .sum();
            PeriodValue { period, value }
        })
        .collect()
}

/// Month-over-month change of the national total of one crime column.
#[must_use]
pub fn national_monthly_changes(
    rows: &[CrimeRecord],
    crime: CrimeType,
    baseline: &CrimeValues,
) -> Vec<PeriodValue> {
    let totals = national_monthly_totals(rows, crime);
    let periods: Vec<String> = totals.iter().map(|t| t.period.clone()).collect();
    let values: Vec<f64> = totals.iter().map(|t| t.value).collect();
    sequential_changes(&periods, &values, baseline.get(&crime).copied())
}

/// Month-over-month changes of one state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChanges {
    /// State name.
    pub state: String,
    /// Change per period. Periods where the state has no row (or no prior
    /// row) are omitted.
    pub changes: Vec<PeriodValue>,
    /// Mean `Total` across the state's rows.
    pub magnitude: f64,
}

/// Month-over-month changes per state.
///
/// `Enero 2024` compares against the state's row in `december_rows`.
#[must_use]
pub fn state_monthly_changes(
    rows: &[CrimeRecord],
    december_rows: &[CrimeRecord],
    crime: CrimeType,
) -> Vec<StateChanges> {
    let periods = unique_periods(rows);
    let mut states: Vec<&str> = Vec::new();
    for row in rows {
        let state = row.text(STATE_COLUMN);
        if !state.is_empty() && !states.contains(&state) {
            states.push(state);
        }
    }

    let find = |state: &str, period: &str| {
        rows.iter()
            .find(|row| row.text(STATE_COLUMN) == state && row.text(PERIOD_COLUMN) == period)
            .map(|row| row.crime(crime))
    };

    states
        .into_iter()
        .map(|state| {
            let changes = periods
                .iter()
                .enumerate()
                .filter_map(|(index, period)| {
                    let current = find(state, period.as_str())?;
                    let prior = if index == 0 {
                        if !is_baseline_period(period) {
                            return None;
                        }
                        december_rows
                            .iter()
                            .find(|row| names_match(row.text(STATE_COLUMN), state))
                            .map(|row| row.crime(crime))?
                    } else {
                        find(state, periods[index - 1].as_str())?
                    };
                    Some(PeriodValue {
                        period: period.clone(),
                        value: percent_change(current, prior),
                    })
                })
                .collect();

            let totals: Vec<f64> = rows
                .iter()
                .filter(|row| row.text(STATE_COLUMN) == state)
                .map(|row| row.crime(CrimeType::Total))
                .collect();

            StateChanges {
                state: state.to_owned(),
                changes,
                magnitude: mean(&totals),
            }
        })
        .collect()
}

/// Picks the `count` states with the most volatile monthly changes.
///
/// The score is the standard deviation of the changes plus a thousandth of
/// the state's mean monthly total, with a bonus of 50 for `featured` states.
/// States in `required` replace the lowest-scoring picks when they did not
/// make the cut.
#[must_use]
pub fn most_variable_states(
    changes: &[StateChanges],
    count: usize,
    featured: &[&str],
    required: &[&str],
) -> Vec<String> {
    let mut scored: Vec<(&str, f64)> = changes
        .iter()
        .map(|state| {
            let values: Vec<f64> = state.changes.iter().map(|c| c.value).collect();
            let avg = mean(&values);
            let variance = mean(&values.iter().map(|v| (v - avg).powi(2)).collect::<Vec<_>>());
            let mut score = variance.sqrt() + state.magnitude / 1000.0;
            if featured.contains(&state.state.as_str()) {
                score += 50.0;
            }
            (state.state.as_str(), score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picked: Vec<String> = scored
        .iter()
        .take(count)
        .map(|(name, _)| (*name).to_owned())
        .collect();

    for &state in required {
        if picked.iter().any(|p| p == state) || !changes.iter().any(|c| c.state == state) {
            continue;
        }
        if let Some(slot) = picked
            .iter_mut()
            .rev()
            .find(|p| !required.contains(&p.as_str()))
        {
            state.clone_into(slot);
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::approx;

    fn monthly(period: &str, doloso: &str, total: &str) -> CrimeRecord {
        CrimeRecord::from_pairs(&[
            ("Periodo", period),
            ("Homicidio doloso", doloso),
            ("Total", total),
        ])
    }

    fn state_row(state: &str, period: &str, total: &str) -> CrimeRecord {
        CrimeRecord::from_pairs(&[("Estado", state), ("Periodo", period), ("Total", total)])
    }

    #[test]
    fn january_2024_compares_against_december_baseline() {
        let rows = vec![
            monthly("Enero 2024", "2193.4", "4741"),
            monthly("Febrero 2024", "1000", "2370.5"),
        ];
        let changes = month_over_month_changes(&rows, &default_baseline());
        assert_eq!(changes.len(), 5);

        let doloso = &changes[0];
        assert_eq!(doloso.label, "Homicidio doloso");
        assert!(approx(doloso.changes[0].value, 10.0));

        let total = changes.last().unwrap();
        assert_eq!(total.label, TOTAL_ROW_LABEL);
        assert!(approx(total.changes[0].value, 0.0));
        assert!(approx(total.changes[1].value, -50.0));
    }

    #[test]
    fn other_first_periods_report_no_change() {
        let rows = vec![monthly("Marzo 2024", "50", "80"), monthly("Abril 2024", "100", "80")];
        let changes = month_over_month_changes(&rows, &default_baseline());
        assert!(approx(changes[0].changes[0].value, 0.0));
        assert!(approx(changes[0].changes[1].value, 100.0));
    }

    #[test]
    fn missing_columns_count_as_zero() {
        let rows = vec![monthly("Enero 2024", "1", "1"), monthly("Febrero 2024", "2", "2")];
        let changes = month_over_month_changes(&rows, &default_baseline());
        let feminicidio = changes
            .iter()
            .find(|c| c.crime == Some(CrimeType::Feminicidio))
            .unwrap();
        assert!(approx(feminicidio.changes[0].value, -100.0));
        assert!(approx(feminicidio.changes[1].value, 0.0));
    }

    #[test]
    fn national_changes_sum_states_per_unique_period() {
        let rows = vec![
            state_row("Sinaloa", "Enero 2024", "100"),
            state_row("Sonora", "Enero 2024", "50"),
            state_row("Sinaloa", "Febrero 2024", "150"),
            state_row("Sonora", "Febrero 2024", "150"),
        ];
        let totals = national_monthly_totals(&rows, CrimeType::Total);
        assert_eq!(totals.len(), 2);
        assert!(approx(totals[0].value, 150.0));
        assert!(approx(totals[1].value, 300.0));

        let mut baseline = CrimeValues::new();
        baseline.insert(CrimeType::Total, 100.0);
        let changes = national_monthly_changes(&rows, CrimeType::Total, &baseline);
        assert!(approx(changes[0].value, 50.0));
        assert!(approx(changes[1].value, 100.0));
    }

    #[test]
    fn december_baseline_sums_loaded_rows() {
        let rows = vec![
            CrimeRecord::from_pairs(&[("Estado", "Sinaloa"), ("Total", "120")]),
            CrimeRecord::from_pairs(&[("Estado", "Sonora"), ("Total", "80")]),
        ];
        let baseline = december_baseline(&rows);
        assert!(approx(baseline[&CrimeType::Total], 200.0));
        assert!(approx(baseline[&CrimeType::Feminicidio], 0.0));

        let fallback = december_baseline(&[]);
        assert!(approx(fallback[&CrimeType::Total], 4741.0));
        assert!(approx(fallback[&CrimeType::HomicidioDoloso], 1994.0));
    }

    #[test]
    fn unique_periods_keep_first_seen_order() {
        let rows = vec![
            state_row("A", "Febrero 2024", "1"),
            state_row("B", "Enero 2024", "1"),
            state_row("C", "Febrero 2024", "1"),
        ];
        assert_eq!(unique_periods(&rows), vec!["Febrero 2024", "Enero 2024"]);
    }

    #[test]
    fn state_changes_use_per_state_december_rows() {
        let rows = vec![
            state_row("Sinaloa", "Enero 2024", "150"),
            state_row("Sinaloa", "Febrero 2024", "75"),
            state_row("Sonora", "Enero 2024", "10"),
        ];
        let december = vec![state_row("Sinaloa", "Diciembre 2023", "100")];
        let changes = state_monthly_changes(&rows, &december, CrimeType::Total);

        let sinaloa = &changes[0];
        assert_eq!(sinaloa.state, "Sinaloa");
        assert!(approx(sinaloa.changes[0].value, 50.0));
        assert!(approx(sinaloa.changes[1].value, -50.0));
        assert!(approx(sinaloa.magnitude, 112.5));

        // Sonora has no December row and no February row
        assert!(changes[1].changes.is_empty());
    }

    #[test]
    fn required_states_replace_lowest_picks() {
        let changes = vec![
            StateChanges {
                state: "A".to_owned(),
                changes: vec![
                    PeriodValue { period: "1".to_owned(), value: 40.0 },
                    PeriodValue { period: "2".to_owned(), value: -40.0 },
                ],
                magnitude: 0.0,
            },
            StateChanges {
                state: "B".to_owned(),
                changes: vec![
                    PeriodValue { period: "1".to_owned(), value: 10.0 },
                    PeriodValue { period: "2".to_owned(), value: -10.0 },
                ],
                magnitude: 0.0,
            },
            StateChanges {
                state: "Sinaloa".to_owned(),
                changes: vec![],
                magnitude: 0.0,
            },
        ];

        let picked = most_variable_states(&changes, 2, &[], &[]);
        assert_eq!(picked, vec!["A", "B"]);

        let picked = most_variable_states(&changes, 2, &[], &["Sinaloa"]);
        assert_eq!(picked, vec!["A", "Sinaloa"]);

        let picked = most_variable_states(&changes, 1, &["B"], &[]);
        assert_eq!(picked, vec!["B"]);
    }
}
