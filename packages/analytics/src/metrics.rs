//! Arithmetic shared by every metric.

/// Incidents per 100,000 inhabitants.
///
/// Returns 0 when the population is unknown or zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_per_100k(count: f64, population: Option<u64>) -> f64 {
    match population {
        Some(population) if population > 0 => count / population as f64 * 100_000.0,
        _ => 0.0,
    }
}

/// Percent change from `prior` to `current`.
///
/// Returns 0 when `prior` is not positive.
#[must_use]
pub fn percent_change(current: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        (current - prior) / prior * 100.0
    } else {
        0.0
    }
}

/// Rounds to a fixed number of decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean; 0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest value, or 0 for an empty iterator.
#[must_use]
pub fn max_or_zero(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, f64::max)
}

#[cfg(test)]
pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_population_or_cases() {
        assert!(approx(rate_per_100k(25.0, None), 0.0));
        assert!(approx(rate_per_100k(25.0, Some(0)), 0.0));
        assert!(approx(rate_per_100k(0.0, Some(3_000_000)), 0.0));
    }

    #[test]
    fn rate_scales_to_100k() {
        assert!(approx(rate_per_100k(31.0, Some(3_100_000)), 1.0));
        assert!(approx(rate_per_100k(1.0, Some(100_000)), 1.0));
    }

    #[test]
    fn percent_change_against_zero_is_zero() {
        assert!(approx(percent_change(10.0, 0.0), 0.0));
        assert!(approx(percent_change(0.0, 0.0), 0.0));
    }

    #[test]
    fn percent_change_properties() {
        for prior in [1.0, 7.0, 250.0] {
            assert!(approx(percent_change(prior, prior), 0.0));
            assert!(approx(percent_change(2.0 * prior, prior), 100.0));
        }
        assert!(approx(percent_change(50.0, 100.0), -50.0));
    }

    #[test]
    fn rounding() {
        assert!(approx(round_to(12.345, 1), 12.3));
        assert!(approx(round_to(33.336, 2), 33.34));
        assert!(approx(round_to(-4.25, 0), -4.0));
    }

    #[test]
    fn mean_and_max_of_empty_are_zero() {
        assert!(approx(mean(&[]), 0.0));
        assert!(approx(max_or_zero(Vec::new()), 0.0));
        assert!(approx(mean(&[1.0, 2.0, 6.0]), 3.0));
        assert!(approx(max_or_zero([3.0, 9.0, 1.0]), 9.0));
    }
}
