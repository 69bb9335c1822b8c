//! Trend series normalization for sparkline rendering.
//!
//! Maps an arbitrary numeric series into a fixed-size plot box so the UI can
//! draw it as an SVG polyline without knowing the value range. Higher values
//! map to smaller y (the top of the box is y = 0).

/// Default plot box width in viewport units.
pub const DEFAULT_WIDTH: f64 = 120.0;
/// Default plot box height in viewport units.
pub const DEFAULT_HEIGHT: f64 = 40.0;

/// Normalize a numeric series into `(x, y)` coordinates within a
/// `width` x `height` box, both rounded to two decimal places.
///
/// An empty series yields an empty vector. A flat series (range 0) maps every
/// point to the visual floor (`y == height`). A single-value series places its
/// lone point at `x == width`.
pub fn build_trend_points(values: &[f64], width: f64, height: f64) -> Vec<(f64, f64)> {
    if values.is_empty() {
        return Vec::new();
    }

    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    // With one value the step degenerates to the full width.
    let step = if values.len() == 1 {
        width
    } else {
        width / (values.len() - 1) as f64
    };

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let x = if values.len() == 1 {
                width
            } else {
                round2(index as f64 * step)
            };
            let normalized = (value - min) / range;
            let y = round2((1.0 - normalized) * height);
            (x, y)
        })
        .collect()
}

/// Normalize with the default 120x40 plot box.
pub fn build_default_trend_points(values: &[f64]) -> Vec<(f64, f64)> {
    build_trend_points(values, DEFAULT_WIDTH, DEFAULT_HEIGHT)
}

/// Serialize coordinates as an SVG polyline `points` attribute
/// (`"x,y x,y ..."`). Numbers print without trailing zeros, so `(0.0, 40.0)`
/// becomes `0,40`.
pub fn points_attribute(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
