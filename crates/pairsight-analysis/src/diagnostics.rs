//! Analysis diagnostics: timing and intermediate values for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! threshold tuning. [`analyze_with_diagnostics`] runs the same stages as
//! [`crate::analyze_with_config`] and returns an identical
//! [`AnalysisResult`] alongside what each stage saw.
//!
//! Time is read through the [`Clock`] trait so the crate stays free of
//! platform time sources; callers supply the implementation.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::{self, Signals};
use crate::types::{
    AnalysisConfig, AnalysisError, AnalysisResult, DominantColor, LabelKind, PixelBuffer,
    ShapeKind,
};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source used to measure stage durations.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDiagnostics {
    /// Stage 1: color statistics.
    pub color: StageDiagnostics,
    /// Stage 2: complexity estimate.
    pub complexity: StageDiagnostics,
    /// Stage 3: shape heuristics.
    pub shapes: StageDiagnostics,
    /// Stage 4: composition.
    pub composition: StageDiagnostics,
    /// Stage 5: label classification.
    pub classify: StageDiagnostics,
    /// Total wall-clock duration of the whole analysis (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts.
    pub summary: AnalysisSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific values.
    pub metrics: StageMetrics,
}

/// Stage-specific values that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Color statistics.
    Color {
        /// Bucket of the average color.
        dominant_color: DominantColor,
        /// Grayscale flag.
        is_grayscale: bool,
        /// Colorful flag.
        is_colorful: bool,
    },
    /// Complexity estimate.
    Complexity {
        /// Normalized variation in `[0, 1]`.
        value: f64,
    },
    /// Shape heuristics.
    Shapes {
        /// Straight-line grid hits.
        straight_line_hits: u64,
        /// Hits needed (exclusive) to report rectangles.
        straight_line_threshold: f64,
        /// Point-symmetric ring probes.
        radial_symmetry_hits: u32,
        /// Probes needed (exclusive) to report circles.
        radial_symmetry_threshold: u32,
    },
    /// Composition.
    Composition {
        /// Rule-of-thirds score.
        rule_of_thirds: f64,
        /// Bilateral symmetry score.
        symmetry: f64,
        /// Center focus.
        center_focus: bool,
    },
    /// Label classification.
    Classify {
        /// `width / height`.
        aspect_ratio: f64,
        /// Labels assigned.
        labels: Vec<LabelKind>,
        /// Shapes reported.
        objects: Vec<ShapeKind>,
    },
}

/// High-level summary for the whole analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Image width in pixels.
    pub image_width: u32,
    /// Image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of labels assigned.
    pub label_count: usize,
    /// Number of shapes reported.
    pub object_count: usize,
}

/// Run the analysis while recording per-stage timing and values.
///
/// # Errors
///
/// Same as [`crate::analyze_with_config`].
pub fn analyze_with_diagnostics<C: Clock>(
    buffer: &PixelBuffer,
    config: &AnalysisConfig,
    clock: &C,
) -> Result<(AnalysisResult, AnalysisDiagnostics), AnalysisError> {
    crate::check_limits(buffer, config)?;
    let start = clock.now();

    let t = clock.now();
    let colors = crate::color::color_stats(buffer, config);
    let color = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Color {
            dominant_color: colors.dominant_color,
            is_grayscale: colors.is_grayscale,
            is_colorful: colors.is_colorful,
        },
    };

    let t = clock.now();
    let complexity_value = crate::complexity::complexity(buffer);
    let complexity = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Complexity {
            value: complexity_value,
        },
    };

    let t = clock.now();
    let straight_line_hits = crate::shapes::straight_line_hits(buffer, config);
    let radial_symmetry_hits = crate::shapes::radial_symmetry_hits(buffer, config);
    #[allow(clippy::cast_precision_loss)]
    let straight_line_threshold = buffer.pixel_count() as f64 / config.line_density_divisor;
    #[allow(clippy::cast_precision_loss)]
    let rectangular = straight_line_hits as f64 > straight_line_threshold;
    let circular = radial_symmetry_hits > config.circle_min_hits;
    let shapes = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Shapes {
            straight_line_hits,
            straight_line_threshold,
            radial_symmetry_hits,
            radial_symmetry_threshold: config.circle_min_hits,
        },
    };

    let t = clock.now();
    let composition_value = crate::composition::analyze_composition(buffer, config);
    let composition = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Composition {
            rule_of_thirds: composition_value.rule_of_thirds,
            symmetry: composition_value.symmetry,
            center_focus: composition_value.center_focus,
        },
    };

    let t = clock.now();
    let signals = Signals {
        aspect_ratio: buffer.aspect_ratio(),
        colors,
        complexity: complexity_value,
        center_focus: composition_value.center_focus,
        rectangular,
        circular,
    };
    let labels = classify::labels(&signals, config);
    let objects = classify::objects(&signals, config);
    let classify = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Classify {
            aspect_ratio: signals.aspect_ratio,
            labels: labels.iter().map(|l| l.description).collect(),
            objects: objects.iter().map(|o| o.name).collect(),
        },
    };

    let summary = AnalysisSummary {
        image_width: buffer.width(),
        image_height: buffer.height(),
        pixel_count: buffer.pixel_count(),
        label_count: labels.len(),
        object_count: objects.len(),
    };
    let result = AnalysisResult {
        labels,
        objects,
        composition: composition_value,
        colors,
    };
    let diagnostics = AnalysisDiagnostics {
        color,
        complexity,
        shapes,
        composition,
        classify,
        total_duration: clock.elapsed(&start),
        summary,
    };
    Ok((result, diagnostics))
}

impl AnalysisDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Analysis Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Color", &self.color),
            ("Complexity", &self.complexity),
            ("Shapes", &self.shapes),
            ("Composition", &self.composition),
            ("Classify", &self.classify),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Labels: {}  |  Shapes: {}",
            self.summary.label_count, self.summary.object_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Color {
            dominant_color,
            is_grayscale,
            is_colorful,
        } => format!("dominant={dominant_color:?} grayscale={is_grayscale} colorful={is_colorful}"),
        StageMetrics::Complexity { value } => format!("value={value:.4}"),
        StageMetrics::Shapes {
            straight_line_hits,
            straight_line_threshold,
            radial_symmetry_hits,
            radial_symmetry_threshold,
        } => format!(
            "lines={straight_line_hits} (>{straight_line_threshold:.1}) ring={radial_symmetry_hits} (>{radial_symmetry_threshold})",
        ),
        StageMetrics::Composition {
            rule_of_thirds,
            symmetry,
            center_focus,
        } => format!("thirds={rule_of_thirds:.2} symmetry={symmetry:.3} center_focus={center_focus}"),
        StageMetrics::Classify {
            aspect_ratio,
            labels,
            objects,
        } => format!(
            "ratio={aspect_ratio:.3} labels={} shapes={}",
            join_display(labels),
            join_display(objects),
        ),
    }
}
