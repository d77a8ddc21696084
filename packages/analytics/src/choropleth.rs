//! Choropleth color binning.
//!
//! Intensities are `value / max`, where the maximum comes from an explicit
//! [`NormalizationBasis`]. Each map uses a fixed [`ColorLadder`]: a step
//! function from intensity to a hex color.

use sinaloa_report_analytics_models::{LegendEntry, NormalizationBasis};

use crate::metrics::max_or_zero;

/// A step function from intensity to color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLadder {
    /// Thresholds, highest first, with the color for intensities at or
    /// above each one.
    pub steps: &'static [(f64, &'static str)],
    /// Whether an intensity equal to a threshold falls in that bin.
    pub inclusive: bool,
    /// Color for any positive intensity below the last threshold.
    pub positive: &'static str,
    /// Color for zero (or negative) intensity.
    pub zero: &'static str,
}

/// Sinaloa municipal choropleth, colored per displayed period.
pub const PERIOD_LADDER: ColorLadder = ColorLadder {
    steps: &[
        (0.8, "#800026"),
        (0.6, "#BD0026"),
        (0.4, "#E31A1C"),
        (0.2, "#FC4E2A"),
    ],
    inclusive: true,
    positive: "#FD8D3C",
    zero: "#cccccc",
};

/// Sinaloa municipal heatmap.
pub const HEATMAP_LADDER: ColorLadder = ColorLadder {
    steps: &[
        (0.9, "#800026"),
        (0.7, "#BD0026"),
        (0.5, "#E31A1C"),
        (0.3, "#FC4E2A"),
        (0.15, "#FD8D3C"),
        (0.05, "#FEB24C"),
    ],
    inclusive: true,
    positive: "#FFEDA0",
    zero: "#e8e8e8",
};

/// Municipal choropleth.
pub const MUNICIPAL_LADDER: ColorLadder = ColorLadder {
    steps: &[
        (0.8, "#8B0000"),
        (0.6, "#DC143C"),
        (0.4, "#FF4500"),
        (0.2, "#FF8C00"),
    ],
    inclusive: true,
    positive: "#FFA500",
    zero: "#cccccc",
};

/// Sinaloa polygons on the spillover map.
pub const SPILLOVER_LADDER: ColorLadder = ColorLadder {
    steps: &[
        (0.8, "#8b0000"),
        (0.6, "#dc143c"),
        (0.4, "#ff4500"),
        (0.2, "#ff6347"),
    ],
    inclusive: true,
    positive: "#ffb6c1",
    zero: "#f8f9fa",
};

/// Total-violence halo around municipal snapshot markers. Thresholds are
/// exclusive and low intensities, zero included, share one color.
pub const SNAPSHOT_LADDER: ColorLadder = ColorLadder {
    steps: &[
        (0.8, "#8B0000"),
        (0.6, "#DC143C"),
        (0.4, "#FF4500"),
        (0.2, "#FFA500"),
        (0.1, "#FFD700"),
    ],
    inclusive: false,
    positive: "#90EE90",
    zero: "#90EE90",
};

impl ColorLadder {
    /// Color for an intensity in `[0, 1]`.
    #[must_use]
    pub fn color(&self, intensity: f64) -> &'static str {
        for &(threshold, color) in self.steps {
            let hit = if self.inclusive {
                intensity >= threshold
            } else {
                intensity > threshold
            };
            if hit {
                return color;
            }
        }
        if intensity > 0.0 {
            self.positive
        } else {
            self.zero
        }
    }

    /// Color for `value` normalized against `max`.
    #[must_use]
    pub fn color_for(&self, value: f64, max: f64) -> &'static str {
        self.color(normalize(value, max))
    }

    /// Legend swatches, darkest first.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let op = if self.inclusive { ">=" } else { ">" };
        let mut entries: Vec<LegendEntry> = self
            .steps
            .iter()
            .map(|&(threshold, color)| LegendEntry {
                label: format!("{op} {:.0}%", threshold * 100.0),
                color: color.to_owned(),
            })
            .collect();
        if self.positive != self.zero {
            entries.push(LegendEntry {
                label: "> 0".to_owned(),
                color: self.positive.to_owned(),
            });
            entries.push(LegendEntry {
                label: "0".to_owned(),
                color: self.zero.to_owned(),
            });
        } else {
            entries.push(LegendEntry {
                label: "Resto".to_owned(),
                color: self.positive.to_owned(),
            });
        }
        entries
    }
}

/// `value / max`, or 0 when `max` is not positive.
#[must_use]
pub fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

/// The maximum to normalize against: the displayed values for
/// [`NormalizationBasis::PeriodMax`], every value of the dataset for
/// [`NormalizationBasis::GlobalMax`].
#[must_use]
pub fn normalization_max(basis: NormalizationBasis, displayed: &[f64], all: &[f64]) -> f64 {
    match basis {
        NormalizationBasis::PeriodMax => max_or_zero(displayed.iter().copied()),
        NormalizationBasis::GlobalMax => max_or_zero(all.iter().copied()),
    }
}

/// Case-count thresholds for Sinaloa municipalities on the spillover map.
const SINALOA_ABSOLUTE_STEPS: [(f64, &str); 4] = [
    (200.0, "#8b0000"),
    (150.0, "#dc143c"),
    (100.0, "#ff4500"),
    (50.0, "#ff6347"),
];
const SINALOA_ABSOLUTE_LOW: &str = "#ffb6c1";
const SINALOA_ABSOLUTE_ZERO: &str = "#f8f9fa";

/// Absolute-count color for Sinaloa municipalities on the spillover map.
#[must_use]
pub fn sinaloa_absolute_color(value: f64) -> &'static str {
    if value <= 0.0 {
        return SINALOA_ABSOLUTE_ZERO;
    }
    SINALOA_ABSOLUTE_STEPS
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(SINALOA_ABSOLUTE_LOW, |&(_, color)| color)
}

/// Legend for [`sinaloa_absolute_color`], darkest first.
#[must_use]
pub fn sinaloa_absolute_legend() -> Vec<LegendEntry> {
    SINALOA_ABSOLUTE_STEPS
        .iter()
        .map(|(threshold, color)| (format!(">= {threshold:.0}"), *color))
        .chain([
            ("> 0".to_owned(), SINALOA_ABSOLUTE_LOW),
            ("0".to_owned(), SINALOA_ABSOLUTE_ZERO),
        ])
        .map(|(label, color)| LegendEntry {
            label,
            color: color.to_owned(),
        })
        .collect()
}

/// Absolute-count color for border municipalities of neighboring states.
#[must_use]
pub fn border_absolute_color(value: f64) -> &'static str {
    match value {
        v if v <= 0.0 => "#f8f9fa",
        v if v >= 10.0 => "#0066cc",
        v if v >= 5.0 => "#3399ff",
        v if v >= 2.0 => "#66b3ff",
        v if v >= 1.0 => "#99ccff",
        _ => "#cce6ff",
    }
}

/// Darkens a `#rrggbb` color by `0.3 + 0.7 * intensity` per channel and
/// returns it as `rgb(r, g, b)`. Malformed colors are returned unchanged.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub fn adjust_color_intensity(hex: &str, intensity: f64) -> String {
    let digits = hex.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
    };

    let (Some(r), Some(g), Some(b)) = (channel(0..2), channel(2..4), channel(4..6)) else {
        log::warn!("Cannot adjust malformed color '{hex}'");
        return hex.to_owned();
    };

    let factor = 0.3 + 0.7 * intensity;
    let scale = |c: u8| (f64::from(c) * factor).round().clamp(0.0, 255.0) as u8;
    format!("rgb({}, {}, {})", scale(r), scale(g), scale(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_gray_and_one_is_darkest() {
        assert_eq!(PERIOD_LADDER.color(0.0), "#cccccc");
        assert_eq!(PERIOD_LADDER.color(1.0), "#800026");
        assert_eq!(HEATMAP_LADDER.color(0.0), "#e8e8e8");
        assert_eq!(HEATMAP_LADDER.color(1.0), "#800026");
    }

    #[test]
    fn boundaries_fall_in_the_higher_bin() {
        assert_eq!(PERIOD_LADDER.color(0.8), "#800026");
        assert_eq!(PERIOD_LADDER.color(0.2), "#FC4E2A");
        assert_eq!(PERIOD_LADDER.color(0.19), "#FD8D3C");
        assert_eq!(HEATMAP_LADDER.color(0.05), "#FEB24C");
        assert_eq!(HEATMAP_LADDER.color(0.01), "#FFEDA0");
        assert_eq!(MUNICIPAL_LADDER.color(0.6), "#DC143C");
        assert_eq!(SPILLOVER_LADDER.color(0.4), "#ff4500");
    }

    #[test]
    fn exclusive_ladder_keeps_boundary_in_lower_bin() {
        assert_eq!(SNAPSHOT_LADDER.color(0.8), "#DC143C");
        assert_eq!(SNAPSHOT_LADDER.color(0.81), "#8B0000");
        assert_eq!(SNAPSHOT_LADDER.color(0.0), "#90EE90");
    }

    #[test]
    fn zero_max_yields_zero_intensity() {
        assert!(normalize(5.0, 0.0).abs() < f64::EPSILON);
        assert_eq!(MUNICIPAL_LADDER.color_for(5.0, 0.0), "#cccccc");
    }

    #[test]
    fn normalization_basis_selects_the_maximum() {
        let displayed = [2.0, 4.0];
        let all = [2.0, 4.0, 10.0];
        assert!((normalization_max(NormalizationBasis::PeriodMax, &displayed, &all) - 4.0).abs() < 1e-9);
        assert!((normalization_max(NormalizationBasis::GlobalMax, &displayed, &all) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn absolute_colors() {
        assert_eq!(sinaloa_absolute_color(0.0), "#f8f9fa");
        assert_eq!(sinaloa_absolute_color(200.0), "#8b0000");
        assert_eq!(sinaloa_absolute_color(120.0), "#ff4500");
        assert_eq!(sinaloa_absolute_color(3.0), "#ffb6c1");
        assert_eq!(border_absolute_color(10.0), "#0066cc");
        assert_eq!(border_absolute_color(1.0), "#99ccff");
        assert_eq!(border_absolute_color(0.5), "#cce6ff");

        let legend = sinaloa_absolute_legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].label, ">= 200");
        assert_eq!(legend[5].color, "#f8f9fa");
    }

    #[test]
    fn color_intensity_scales_channels() {
        assert_eq!(adjust_color_intensity("#e74c3c", 1.0), "rgb(231, 76, 60)");
        assert_eq!(adjust_color_intensity("#e74c3c", 0.0), "rgb(69, 23, 18)");
        assert_eq!(adjust_color_intensity("nope", 0.5), "nope");
    }

    #[test]
    fn legend_lists_every_bin() {
        let legend = PERIOD_LADDER.legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].label, ">= 80%");
        assert_eq!(legend[5].color, "#cccccc");
        assert_eq!(SNAPSHOT_LADDER.legend().len(), 6);
    }
}
