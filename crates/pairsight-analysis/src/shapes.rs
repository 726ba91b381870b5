//! Primitive shape heuristics.
//!
//! Neither detector locates a shape. Both answer a yes/no question about
//! the whole image:
//!
//! - **Rectangles**: are there many short horizontal runs of nearly
//!   constant brightness (straight edges and flat bands)?
//! - **Circles**: is the brightness on a ring around the image center
//!   point-symmetric?

use crate::types::{AnalysisConfig, PixelBuffer};

/// Count straight-line hits on a coarse grid.
///
/// Grid points are spaced [`AnalysisConfig::line_window`] apart in both
/// directions, with `x` bounded to `width - line_window` so each run fits
/// inside the row. At each grid point the run `x..x + line_window` is
/// compared with the brightness at `x` (the anchor, which always matches
/// itself). A run is a hit when more than
/// [`AnalysisConfig::line_min_continuity`] of its pixels are within
/// [`AnalysisConfig::line_brightness_tolerance`] of the anchor.
///
/// Images no wider than the window produce no grid points and no hits.
/// A zero window (rejected by [`AnalysisConfig::validate`]) has empty runs
/// and also produces no hits.
#[must_use]
pub fn straight_line_hits(buffer: &PixelBuffer, config: &AnalysisConfig) -> u64 {
    let window = config.line_window;
    let step = (window as usize).max(1);
    let tolerance = config.line_brightness_tolerance;
    let min_continuity = config.line_min_continuity as usize;

    let mut hits = 0;
    for y in (0..buffer.height()).step_by(step) {
        for x in (0..buffer.width().saturating_sub(window)).step_by(step) {
            let anchor = buffer.brightness(x, y);
            let continuity = (0..window)
                .filter(|&i| (anchor - buffer.brightness(x + i, y)).abs() < tolerance)
                .count();
            if continuity > min_continuity {
                hits += 1;
            }
        }
    }
    hits
}

/// Returns `true` if straight-line hits exceed
/// `width * height / line_density_divisor`.
#[must_use]
pub fn has_rectangular_shapes(buffer: &PixelBuffer, config: &AnalysisConfig) -> bool {
    let hits = straight_line_hits(buffer, config);
    #[allow(clippy::cast_precision_loss)]
    let (hits, threshold) = (
        hits as f64,
        buffer.pixel_count() as f64 / config.line_density_divisor,
    );
    hits > threshold
}

/// Count point-symmetric probe pairs on a ring around the center.
///
/// The ring has radius `min(width, height) / 4`. For each angle
/// `0, step, 2*step, ... < 360` degrees the probe at `θ` is compared with
/// the probe at `θ + 180°`; the pair is a hit when both land inside the
/// image and their brightness differs by less than
/// [`AnalysisConfig::circle_brightness_tolerance`]. Probe coordinates are
/// floored to pixel indices. A zero step is treated as 1°.
#[must_use]
pub fn radial_symmetry_hits(buffer: &PixelBuffer, config: &AnalysisConfig) -> u32 {
    let width = f64::from(buffer.width());
    let height = f64::from(buffer.height());
    let (cx, cy) = (width / 2.0, height / 2.0);
    let radius = width.min(height) / 4.0;

    let probe = |degrees: u32| {
        let theta = f64::from(degrees).to_radians();
        (theta.cos().mul_add(radius, cx), theta.sin().mul_add(radius, cy))
    };
    let inside = |(x, y): (f64, f64)| x >= 0.0 && x < width && y >= 0.0 && y < height;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let brightness = |(x, y): (f64, f64)| buffer.brightness(x.floor() as u32, y.floor() as u32);

    let mut hits = 0;
    let step = (config.circle_angle_step_degrees as usize).max(1);
    for angle in (0..360).step_by(step) {
        let near = probe(angle);
        let far = probe(angle + 180);
        if !(inside(near) && inside(far)) {
            continue;
        }
        if (brightness(near) - brightness(far)).abs() < config.circle_brightness_tolerance {
            hits += 1;
        }
    }
    hits
}

/// Returns `true` if more than [`AnalysisConfig::circle_min_hits`] probe
/// pairs are symmetric (with the default 10° step: more than half of 36).
#[must_use]
pub fn has_circular_shapes(buffer: &PixelBuffer, config: &AnalysisConfig) -> bool {
    radial_symmetry_hits(buffer, config) > config.circle_min_hits
}
