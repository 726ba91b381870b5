//! Whole-image color statistics.
//!
//! Accumulates per-channel sums over every pixel and classifies each
//! pixel as near-neutral or chromatic. This is the first stage of the
//! pipeline and depends on nothing but the pixel buffer.

use crate::types::{AnalysisConfig, ColorStats, DominantColor, PixelBuffer, Rgb};

/// Compute averages, grayscale/colorful flags and the dominant color.
///
/// A pixel is near-neutral when `|R-G|`, `|G-B|` and `|R-B|` are all below
/// [`AnalysisConfig::grayscale_pixel_tolerance`]; every other pixel counts
/// as chromatic. The two image-level flags compare those counts against
/// independent ratios, so they are not complements of each other.
#[must_use = "returns the computed color statistics"]
pub fn color_stats(buffer: &PixelBuffer, config: &AnalysisConfig) -> ColorStats {
    let tolerance = i16::from(config.grayscale_pixel_tolerance);
    let (mut sum_r, mut sum_g, mut sum_b) = (0_u64, 0_u64, 0_u64);
    let mut neutral = 0_u64;

    for [r, g, b] in buffer.pixels() {
        sum_r += u64::from(r);
        sum_g += u64::from(g);
        sum_b += u64::from(b);

        let (r, g, b) = (i16::from(r), i16::from(g), i16::from(b));
        if (r - g).abs() < tolerance && (g - b).abs() < tolerance && (r - b).abs() < tolerance {
            neutral += 1;
        }
    }

    let total = buffer.pixel_count();
    let chromatic = total - neutral;

    #[allow(clippy::cast_precision_loss)]
    let (average, neutral_ratio, chromatic_ratio) = {
        let total = total as f64;
        (
            Rgb {
                r: sum_r as f64 / total,
                g: sum_g as f64 / total,
                b: sum_b as f64 / total,
            },
            neutral as f64 / total,
            chromatic as f64 / total,
        )
    };

    ColorStats {
        average,
        is_grayscale: neutral_ratio > config.grayscale_ratio,
        is_colorful: chromatic_ratio > config.colorful_ratio,
        dominant_color: dominant_color(average, config.gray_dominant_tolerance),
    }
}

/// Bucket an average color.
///
/// A channel that is strictly greater than both others wins. Otherwise
/// (two channels tie for the maximum) the color is `Gray` when every
/// channel difference is below `gray_tolerance`, else `Mixed`.
#[must_use]
pub fn dominant_color(average: Rgb, gray_tolerance: f64) -> DominantColor {
    let Rgb { r, g, b } = average;
    if r > g && r > b {
        DominantColor::Red
    } else if g > r && g > b {
        DominantColor::Green
    } else if b > r && b > g {
        DominantColor::Blue
    } else if (r - g).abs() < gray_tolerance
        && (g - b).abs() < gray_tolerance
        && (r - b).abs() < gray_tolerance
    {
        DominantColor::Gray
    } else {
        DominantColor::Mixed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RgbaImage;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
        let img = RgbaImage::from_fn(width, height, |_, _| image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
        PixelBuffer::from_rgba_image(img).unwrap()
    }

    #[test]
    fn mid_gray_is_grayscale_and_gray() {
        let stats = color_stats(&solid(8, 8, [128, 128, 128]), &AnalysisConfig::default());
        assert!(stats.is_grayscale);
        assert!(!stats.is_colorful);
        assert_eq!(stats.dominant_color, DominantColor::Gray);
        assert!((stats.average.r - 128.0).abs() < f64::EPSILON);
    }

    #[test]
    fn saturated_red_is_colorful_and_red() {
        let stats = color_stats(&solid(4, 4, [220, 30, 40]), &AnalysisConfig::default());
        assert!(!stats.is_grayscale);
        assert!(stats.is_colorful);
        assert_eq!(stats.dominant_color, DominantColor::Red);
    }

    #[test]
    fn half_and_half_is_neither_grayscale_nor_colorful() {
        // 50% neutral, 50% chromatic: below both the 0.8 and 0.6 ratios.
        let img = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Rgba([100, 100, 100, 255])
            } else {
                image::Rgba([0, 0, 200, 255])
            }
        });
        let stats = color_stats(
            &PixelBuffer::from_rgba_image(img).unwrap(),
            &AnalysisConfig::default(),
        );
        assert!(!stats.is_grayscale);
        assert!(!stats.is_colorful);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let img = RgbaImage::from_fn(3, 3, |x, _| {
            image::Rgba([50, 50, 50, u8::try_from(x * 100).unwrap()])
        });
        let stats = color_stats(
            &PixelBuffer::from_rgba_image(img).unwrap(),
            &AnalysisConfig::default(),
        );
        assert!((stats.average.g - 50.0).abs() < f64::EPSILON);
        assert!(stats.is_grayscale);
    }

    #[test]
    fn averages_stay_in_channel_range() {
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            image::Rgba([
                u8::try_from(x * 16).unwrap(),
                u8::try_from(y * 16).unwrap(),
                255,
                255,
            ])
        });
        let stats = color_stats(
            &PixelBuffer::from_rgba_image(img).unwrap(),
            &AnalysisConfig::default(),
        );
        for channel in [stats.average.r, stats.average.g, stats.average.b] {
            assert!((0.0..=255.0).contains(&channel), "channel {channel}");
        }
    }

    #[test]
    fn dominant_color_ties() {
        let gray_tie = Rgb {
            r: 100.0,
            g: 100.0,
            b: 90.0,
        };
        assert_eq!(dominant_color(gray_tie, 20.0), DominantColor::Gray);

        let mixed_tie = Rgb {
            r: 200.0,
            g: 200.0,
            b: 20.0,
        };
        assert_eq!(dominant_color(mixed_tie, 20.0), DominantColor::Mixed);
    }

    #[test]
    fn dominant_color_strict_maximum() {
        let green = Rgb {
            r: 10.0,
            g: 11.0,
            b: 10.0,
        };
        assert_eq!(dominant_color(green, 20.0), DominantColor::Green);
        let blue = Rgb {
            r: 0.0,
            g: 0.0,
            b: 1.0,
        };
        assert_eq!(dominant_color(blue, 20.0), DominantColor::Blue);
    }
}
