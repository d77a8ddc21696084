//! Circle marker sizing.

/// Radius bounds for proportional circle markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerScale {
    /// Smallest radius in pixels.
    pub min_radius: f64,
    /// Largest radius in pixels.
    pub max_radius: f64,
    /// Added to `min_radius` when every value is at most 1.
    pub small_bump: f64,
    /// Added to `min_radius` when all positive values are equal.
    pub flat_bump: f64,
}

/// Municipal markers on the Sinaloa heatmap.
pub const HEATMAP_MARKERS: MarkerScale = MarkerScale {
    min_radius: 8.0,
    max_radius: 35.0,
    small_bump: 2.0,
    flat_bump: 8.0,
};

/// Municipal markers on the regional map.
pub const REGIONAL_MARKERS: MarkerScale = MarkerScale {
    min_radius: 3.0,
    max_radius: 12.0,
    small_bump: 1.0,
    flat_bump: 4.0,
};

/// Municipal markers on the crime-type map. Equal values sit midway.
pub const MUNICIPAL_MARKERS: MarkerScale = MarkerScale {
    min_radius: 8.0,
    max_radius: 30.0,
    small_bump: 11.0,
    flat_bump: 11.0,
};

/// Smallest and largest positive value, or `None` when nothing is positive.
#[must_use]
pub fn positive_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| *v > 0.0)
        .fold(None, |extent, v| match extent {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

impl MarkerScale {
    /// Radius for `value` given the extent of positive values across the
    /// dataset. Returns `None` for values that get no marker.
    #[must_use]
    pub fn radius(&self, value: f64, extent: (f64, f64)) -> Option<f64> {
        if value <= 0.0 {
            return None;
        }
        let (min, max) = extent;
        let radius = if max <= 1.0 {
            self.min_radius + self.small_bump
        } else if (max - min).abs() < f64::EPSILON {
            self.min_radius + self.flat_bump
        } else {
            let ratio = (value - min) / (max - min);
            ratio.mul_add(self.max_radius - self.min_radius, self.min_radius)
        };
        Some(radius.max(self.min_radius))
    }
}

/// Radius of a border-municipality circle: 8 to 30 pixels in proportion
/// to the period maximum (at least 1).
#[must_use]
pub fn border_marker_radius(value: f64, period_max: f64) -> f64 {
    let max = period_max.max(1.0);
    (8.0 + value / max * 22.0).clamp(8.0, 30.0)
}

/// Point size of the selected crime on the municipal snapshot map.
#[must_use]
pub fn snapshot_point_radius(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max * 20.0).max(5.0)
    } else {
        5.0
    }
}

/// Radius in meters of the total-violence halo on the municipal snapshot map.
#[must_use]
pub fn snapshot_halo_meters(total: f64) -> f64 {
    (total * 100.0).max(1000.0)
}
