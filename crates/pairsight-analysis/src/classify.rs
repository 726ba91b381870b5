//! Semantic labels and shape badges.
//!
//! Combines aspect ratio, color statistics, complexity and the shape and
//! composition heuristics into a set of labels. Labels are only ever
//! appended; an image usually carries several.

use crate::types::{AnalysisConfig, ColorStats, DetectedObject, Label, LabelKind, ShapeKind};

/// Per-image signals the classifier consumes.
///
/// Computed by the earlier stages and passed in, so classification itself
/// never touches pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    /// `width / height`.
    pub aspect_ratio: f64,
    /// Output of [`crate::color::color_stats`].
    pub colors: ColorStats,
    /// Output of [`crate::complexity::complexity`].
    pub complexity: f64,
    /// Output of [`crate::composition::has_center_focus`].
    pub center_focus: bool,
    /// Output of [`crate::shapes::has_rectangular_shapes`].
    pub rectangular: bool,
    /// Output of [`crate::shapes::has_circular_shapes`].
    pub circular: bool,
}

/// Derive labels, in detection order.
///
/// 1. Orientation: `landscape`, `portrait`, or `square` (exactly one).
/// 2. Palette: `monochrome` if grayscale, else `colorful` if colorful.
/// 3. Texture: `complex` or `simple`, or neither in the middle band.
/// 4. `person`: taller than wide and center-focused.
/// 5. `architecture`: wide enough and has straight lines.
///
/// Every label carries [`AnalysisConfig::label_score`].
#[must_use]
pub fn labels(signals: &Signals, config: &AnalysisConfig) -> Vec<Label> {
    let mut kinds = Vec::with_capacity(5);

    let ratio = signals.aspect_ratio;
    kinds.push(if ratio > config.landscape_ratio {
        LabelKind::Landscape
    } else if ratio < config.portrait_ratio {
        LabelKind::Portrait
    } else {
        LabelKind::Square
    });

    if signals.colors.is_grayscale {
        kinds.push(LabelKind::Monochrome);
    } else if signals.colors.is_colorful {
        kinds.push(LabelKind::Colorful);
    }

    if signals.complexity > config.complex_threshold {
        kinds.push(LabelKind::Complex);
    } else if signals.complexity < config.simple_threshold {
        kinds.push(LabelKind::Simple);
    }

    if ratio < config.person_max_ratio && signals.center_focus {
        kinds.push(LabelKind::Person);
    }

    if ratio > config.architecture_min_ratio && signals.rectangular {
        kinds.push(LabelKind::Architecture);
    }

    kinds
        .into_iter()
        .map(|description| Label {
            description,
            score: config.label_score,
        })
        .collect()
}

/// Shape badges, independent of the label set.
///
/// Every badge carries [`AnalysisConfig::object_score`].
#[must_use]
pub fn objects(signals: &Signals, config: &AnalysisConfig) -> Vec<DetectedObject> {
    [
        (signals.rectangular, ShapeKind::Rectangle),
        (signals.circular, ShapeKind::Circle),
    ]
    .into_iter()
    .filter(|&(detected, _)| detected)
    .map(|(_, name)| DetectedObject {
        name,
        score: config.object_score,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DominantColor, Rgb};

    fn signals(aspect_ratio: f64) -> Signals {
        Signals {
            aspect_ratio,
            colors: ColorStats {
                average: Rgb {
                    r: 0.0,
                    g: 0.0,
                    b: 0.0,
                },
                is_grayscale: false,
                is_colorful: false,
                dominant_color: DominantColor::Gray,
            },
            complexity: 0.5,
            center_focus: false,
            rectangular: false,
            circular: false,
        }
    }

    fn kinds(signals: &Signals) -> Vec<LabelKind> {
        labels(signals, &AnalysisConfig::default())
            .into_iter()
            .map(|label| label.description)
            .collect()
    }

    #[test]
    fn orientation_buckets() {
        assert_eq!(kinds(&signals(2.0)), vec![LabelKind::Landscape]);
        assert_eq!(kinds(&signals(0.5)), vec![LabelKind::Portrait]);
        assert_eq!(kinds(&signals(1.0)), vec![LabelKind::Square]);
        // Boundaries are exclusive.
        assert_eq!(kinds(&signals(1.5)), vec![LabelKind::Square]);
        assert_eq!(kinds(&signals(0.8)), vec![LabelKind::Square]);
    }

    #[test]
    fn grayscale_wins_over_colorful() {
        let mut s = signals(1.0);
        s.colors.is_grayscale = true;
        s.colors.is_colorful = true;
        assert_eq!(kinds(&s), vec![LabelKind::Square, LabelKind::Monochrome]);

        s.colors.is_grayscale = false;
        assert_eq!(kinds(&s), vec![LabelKind::Square, LabelKind::Colorful]);
    }

    #[test]
    fn complexity_bands() {
        let mut s = signals(1.0);
        s.complexity = 0.9;
        assert!(kinds(&s).contains(&LabelKind::Complex));
        s.complexity = 0.1;
        assert!(kinds(&s).contains(&LabelKind::Simple));
        s.complexity = 0.5;
        let middle = kinds(&s);
        assert!(!middle.contains(&LabelKind::Complex));
        assert!(!middle.contains(&LabelKind::Simple));
    }

    #[test]
    fn person_needs_tall_frame_and_center_focus() {
        let mut s = signals(0.9);
        s.center_focus = true;
        assert_eq!(kinds(&s), vec![LabelKind::Square, LabelKind::Person]);

        s.aspect_ratio = 1.0;
        assert!(!kinds(&s).contains(&LabelKind::Person));
    }

    #[test]
    fn architecture_needs_wide_frame_and_straight_lines() {
        let mut s = signals(1.3);
        s.rectangular = true;
        assert_eq!(kinds(&s), vec![LabelKind::Square, LabelKind::Architecture]);

        s.aspect_ratio = 1.2;
        assert!(!kinds(&s).contains(&LabelKind::Architecture));
    }

    #[test]
    fn every_label_carries_the_configured_score() {
        let mut s = signals(2.0);
        s.rectangular = true;
        s.complexity = 0.0;
        let config = AnalysisConfig {
            label_score: 0.42,
            ..AnalysisConfig::default()
        };
        let result = labels(&s, &config);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|l| (l.score - 0.42).abs() < f64::EPSILON));
    }

    #[test]
    fn objects_follow_shape_flags() {
        let config = AnalysisConfig::default();
        let mut s = signals(1.0);
        assert!(objects(&s, &config).is_empty());

        s.rectangular = true;
        s.circular = true;
        let found = objects(&s, &config);
        assert_eq!(
            found.iter().map(|o| o.name).collect::<Vec<_>>(),
            vec![ShapeKind::Rectangle, ShapeKind::Circle]
        );
        assert!(found.iter().all(|o| (o.score - 0.7).abs() < f64::EPSILON));
    }
}
