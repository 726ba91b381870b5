//! Compositional features: center focus, rule of thirds, left-right
//! symmetry.

use crate::types::{AnalysisConfig, Composition, PixelBuffer};

/// Returns `true` if the point `(x, y)` is brighter than the mean of the
/// four image corners by more than [`AnalysisConfig::focus_margin`].
///
/// Coordinates are floored to pixel indices and clamped to the image, so
/// a point past an edge reads the nearest edge pixel.
#[must_use]
pub fn has_focus_at(buffer: &PixelBuffer, x: f64, y: f64, config: &AnalysisConfig) -> bool {
    let (right, bottom) = (buffer.width() - 1, buffer.height() - 1);
    let corners = (buffer.brightness(0, 0)
        + buffer.brightness(right, 0)
        + buffer.brightness(0, bottom)
        + buffer.brightness(right, bottom))
        / 4.0;

    // `as` saturates: negative and NaN become 0.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (px, py) = (x.floor() as u32, y.floor() as u32);
    let point = buffer.brightness(px.min(right), py.min(bottom));
    point > corners + config.focus_margin
}

/// Center focus: [`has_focus_at`] the image center.
#[must_use]
pub fn has_center_focus(buffer: &PixelBuffer, config: &AnalysisConfig) -> bool {
    has_focus_at(
        buffer,
        f64::from(buffer.width()) / 2.0,
        f64::from(buffer.height()) / 2.0,
        config,
    )
}

/// Fraction of the four thirds-line intersections that are in focus.
///
/// Returns one of `0.0, 0.25, 0.5, 0.75, 1.0`.
#[must_use]
pub fn rule_of_thirds(buffer: &PixelBuffer, config: &AnalysisConfig) -> f64 {
    let third_x = f64::from(buffer.width()) / 3.0;
    let third_y = f64::from(buffer.height()) / 3.0;
    let intersections = [
        (third_x, third_y),
        (third_x * 2.0, third_y),
        (third_x, third_y * 2.0),
        (third_x * 2.0, third_y * 2.0),
    ];

    let in_focus = intersections
        .iter()
        .filter(|&&(x, y)| has_focus_at(buffer, x, y, config))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let score = in_focus as f64 / intersections.len() as f64;
    score
}

/// Bilateral symmetry in `[0, 1]`.
///
/// Each pixel in the left half (the middle column of an odd-width image
/// included, compared with itself) is matched against its horizontal
/// mirror `width - 1 - x`. A pair matches when brightness differs by less
/// than [`AnalysisConfig::symmetry_tolerance`]. Returns the fraction of
/// matching pairs, or 0 when there are no pairs.
#[must_use]
pub fn symmetry(buffer: &PixelBuffer, config: &AnalysisConfig) -> f64 {
    let width = buffer.width();
    let half = width.div_ceil(2);

    let mut matches = 0_u64;
    let mut total = 0_u64;
    for y in 0..buffer.height() {
        for x in 0..half {
            let left = buffer.brightness(x, y);
            let right = buffer.brightness(width - 1 - x, y);
            if (left - right).abs() < config.symmetry_tolerance {
                matches += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = matches as f64 / total as f64;
    score
}

/// Run every composition check.
#[must_use]
pub fn analyze_composition(buffer: &PixelBuffer, config: &AnalysisConfig) -> Composition {
    Composition {
        rule_of_thirds: rule_of_thirds(buffer, config),
        symmetry: symmetry(buffer, config),
        center_focus: has_center_focus(buffer, config),
    }
}
