//! Output shapes for the CLI: JSON documents and plain-text summaries.

use std::fmt::Write as _;
use std::path::Path;

use pairsight_analysis::{AnalysisDiagnostics, AnalysisResult, ComparisonResult};
use serde::Serialize;

/// One analyzed image.
#[derive(Debug, Serialize)]
pub struct ImageReport<'a> {
    /// Source file.
    pub path: &'a Path,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Analysis output.
    pub analysis: AnalysisResult,
    /// Per-stage diagnostics, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<AnalysisDiagnostics>,
}

/// Two analyzed images and their comparison.
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    /// First image.
    pub first: ImageReport<'a>,
    /// Second image.
    pub second: ImageReport<'a>,
    /// Similarity outcome.
    pub comparison: ComparisonResult,
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl ImageReport<'_> {
    /// Plain-text summary, one field per line.
    #[must_use]
    pub fn render(&self) -> String {
        let analysis = &self.analysis;
        let mut out = format!("{} ({}x{})\n", self.path.display(), self.width, self.height);

        let labels = if analysis.labels.is_empty() {
            "-".to_string()
        } else {
            analysis
                .labels
                .iter()
                .map(|l| format!("{} ({:.2})", l.description, l.score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let shapes = if analysis.objects.is_empty() {
            "-".to_string()
        } else {
            analysis
                .objects
                .iter()
                .map(|o| format!("{} ({:.2})", o.name, o.score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let c = &analysis.composition;
        let colors = &analysis.colors;

        // Writing to a String cannot fail.
        let _ = writeln!(out, "  labels:      {labels}");
        let _ = writeln!(out, "  shapes:      {shapes}");
        let _ = writeln!(
            out,
            "  composition: thirds {:.2}, symmetry {:.3}, center focus {}",
            c.rule_of_thirds,
            c.symmetry,
            yes_no(c.center_focus),
        );
        let _ = write!(
            out,
            "  colors:      avg rgb({:.1}, {:.1}, {:.1}), dominant {:?}, grayscale {}, colorful {}",
            colors.average.r,
            colors.average.g,
            colors.average.b,
            colors.dominant_color,
            yes_no(colors.is_grayscale),
            yes_no(colors.is_colorful),
        );

        if let Some(diagnostics) = &self.diagnostics {
            out.push_str("\n\n");
            out.push_str(&diagnostics.report());
        }
        out
    }
}

impl ComparisonReport<'_> {
    /// Plain-text summary of both images followed by the verdict.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{}\n\n{}\n\nSimilarity: {}% ({})",
            self.first.render(),
            self.second.render(),
            self.comparison.score,
            self.comparison.reason,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pairsight_analysis::{PixelBuffer, RgbaImage, analyze, compare};

    fn report(path: &Path) -> ImageReport<'_> {
        let img = RgbaImage::from_fn(40, 20, |_, _| image::Rgba([128, 128, 128, 255]));
        let buffer = PixelBuffer::from_rgba_image(img).unwrap();
        ImageReport {
            path,
            width: buffer.width(),
            height: buffer.height(),
            analysis: analyze(&buffer).unwrap(),
            diagnostics: None,
        }
    }

    #[test]
    fn render_lists_labels_and_shapes() {
        let text = report(Path::new("flat.png")).render();
        assert!(text.starts_with("flat.png (40x20)"));
        assert!(text.contains("landscape (0.80)"));
        assert!(text.contains("monochrome (0.80)"));
        assert!(text.contains("rectangle (0.70)"));
        assert!(text.contains("center focus no"));
    }

    #[test]
    fn json_omits_missing_diagnostics() {
        let json = serde_json::to_value(report(Path::new("flat.png"))).unwrap();
        assert_eq!(json["path"], "flat.png");
        assert_eq!(json["width"], 40);
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn comparison_render_ends_with_verdict() {
        let first = report(Path::new("a.png"));
        let second = report(Path::new("b.png"));
        let comparison = compare(&first.analysis, &second.analysis);
        let text = ComparisonReport {
            first,
            second,
            comparison,
        }
        .render();
        assert!(text.ends_with("Similarity: 100% (similarity based on 4 shared labels)"));
    }
}
