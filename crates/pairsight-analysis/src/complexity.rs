//! Local-neighborhood brightness variation.
//!
//! A cheap proxy for texture and edge density: for every interior pixel,
//! how far its brightness sits from the mean of its 4-neighbors.

use crate::types::PixelBuffer;

/// Estimate image complexity in `[0, 1]`. Higher means busier.
///
/// The one-pixel border is skipped (no wraparound, no reflection), so
/// images narrower or shorter than 3 pixels have no interior and score 0.
/// The accumulated variation is normalized by `width * height * 255`,
/// border included, then clamped to 1.
#[must_use]
pub fn complexity(buffer: &PixelBuffer) -> f64 {
    let (width, height) = (buffer.width(), buffer.height());
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut variation = 0.0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = buffer.brightness(x, y);
            let neighbors = (buffer.brightness(x, y - 1)
                + buffer.brightness(x, y + 1)
                + buffer.brightness(x - 1, y)
                + buffer.brightness(x + 1, y))
                / 4.0;
            variation += (center - neighbors).abs();
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let normalizer = buffer.pixel_count() as f64 * 255.0;
    (variation / normalizer).min(1.0)
}
