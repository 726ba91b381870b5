//! pairsight-analysis: Heuristic image characterization (sans-IO).
//!
//! Derives semantic labels, primitive shapes, compositional features and
//! color statistics from a decoded RGBA pixel buffer, then judges whether
//! two images are compatible and how similar they are:
//!
//! color statistics, complexity, shapes -> composition -> labels ->
//! compatibility and similarity.
//!
//! This crate has **no I/O** -- it operates on an in-memory
//! [`PixelBuffer`] and returns owned values. Image decoding lives in the
//! caller (see `pairsight-cli`). Every stage is a pure function of its
//! input, so analyses of different buffers can run on separate threads
//! without coordination.

pub mod classify;
pub mod color;
pub mod complexity;
pub mod composition;
pub mod diagnostics;
pub mod shapes;
pub mod similarity;
pub mod types;

pub use diagnostics::{AnalysisDiagnostics, Clock, analyze_with_diagnostics};
pub use types::{
    AnalysisConfig, AnalysisError, AnalysisResult, ColorStats, ComparisonResult, Composition,
    DetectedObject, DominantColor, Label, LabelKind, PixelBuffer, Rgb, RgbaImage, ShapeKind,
};

use classify::Signals;

/// Analyze a pixel buffer with the default thresholds.
///
/// # Errors
///
/// Returns [`AnalysisError::TooLarge`] if either dimension exceeds
/// [`AnalysisConfig::DEFAULT_MAX_DIMENSION`].
pub fn analyze(buffer: &PixelBuffer) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_config(buffer, &AnalysisConfig::default())
}

/// Analyze a pixel buffer.
///
/// # Pipeline steps
///
/// 1. Color statistics
/// 2. Complexity estimate
/// 3. Rectangle and circle heuristics
/// 4. Composition (thirds, symmetry, center focus)
/// 5. Labels and shape badges
///
/// Calling this twice on the same buffer yields identical results.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] if `config` fails
/// [`AnalysisConfig::validate`].
/// Returns [`AnalysisError::TooLarge`] if either dimension exceeds
/// [`AnalysisConfig::max_dimension`].
pub fn analyze_with_config(
    buffer: &PixelBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    check_limits(buffer, config)?;
    let _span = tracing::debug_span!(
        "analyze",
        width = buffer.width(),
        height = buffer.height()
    )
    .entered();

    // 1. Color statistics.
    let colors = color::color_stats(buffer, config);
    tracing::trace!(?colors, "color statistics");

    // 2. Complexity.
    let complexity = complexity::complexity(buffer);
    tracing::trace!(complexity, "complexity");

    // 3. Shapes.
    let rectangular = shapes::has_rectangular_shapes(buffer, config);
    let circular = shapes::has_circular_shapes(buffer, config);
    tracing::trace!(rectangular, circular, "shape heuristics");

    // 4. Composition.
    let composition = composition::analyze_composition(buffer, config);
    tracing::trace!(?composition, "composition");

    // 5. Classification.
    let signals = Signals {
        aspect_ratio: buffer.aspect_ratio(),
        colors,
        complexity,
        center_focus: composition.center_focus,
        rectangular,
        circular,
    };
    let labels = classify::labels(&signals, config);
    let objects = classify::objects(&signals, config);
    tracing::debug!(
        labels = labels.len(),
        objects = objects.len(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        labels,
        objects,
        composition,
        colors,
    })
}

/// Compare two analyses.
///
/// See [`similarity::score`] for the scoring rules.
#[must_use]
pub fn compare(a: &AnalysisResult, b: &AnalysisResult) -> ComparisonResult {
    similarity::score(Some(a), Some(b))
}

/// Compare two analyses that may be missing (e.g. one image failed to
/// load). A missing side is always incompatible.
#[must_use]
pub fn compare_optional(
    a: Option<&AnalysisResult>,
    b: Option<&AnalysisResult>,
) -> ComparisonResult {
    similarity::score(a, b)
}

/// Refuse configurations and buffers the stages must not run on.
pub(crate) fn check_limits(
    buffer: &PixelBuffer,
    config: &AnalysisConfig,
) -> Result<(), AnalysisError> {
    config.validate()?;
    let (width, height) = (buffer.width(), buffer.height());
    if width > config.max_dimension || height > config.max_dimension {
        tracing::warn!(width, height, max = config.max_dimension, "refusing oversized image");
        return Err(AnalysisError::TooLarge {
            width,
            height,
            max: config.max_dimension,
        });
    }
    Ok(())
}
