//! Compatibility check and label-overlap similarity between two analyses.

use std::collections::BTreeSet;

use crate::types::{AnalysisResult, ComparisonResult, LabelKind};

/// Label pairs that cannot appear across two compatible images.
///
/// Order within a pair does not matter: image A carrying either member
/// while image B carries the other makes the pair incompatible.
pub const INCOMPATIBLE_PAIRS: [(LabelKind, LabelKind); 4] = [
    (LabelKind::Person, LabelKind::Architecture),
    (LabelKind::Person, LabelKind::Landscape),
    (LabelKind::Portrait, LabelKind::Building),
    (LabelKind::Monochrome, LabelKind::Colorful),
];

/// Score reported for incompatible (or missing) analyses.
pub const INCOMPATIBLE_SCORE: u8 = 5;

/// Reason reported alongside [`INCOMPATIBLE_SCORE`].
pub const INCOMPATIBLE_REASON: &str = "images incompatible";

/// Returns `false` if either analysis is missing or the two carry
/// opposite members of an [`INCOMPATIBLE_PAIRS`] entry.
#[must_use]
pub fn are_compatible(a: Option<&AnalysisResult>, b: Option<&AnalysisResult>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };

    !INCOMPATIBLE_PAIRS.iter().any(|&(first, second)| {
        (a.has_label(first) && b.has_label(second)) || (a.has_label(second) && b.has_label(first))
    })
}

/// Score how similar two analyses are.
///
/// Incompatible or missing inputs score [`INCOMPATIBLE_SCORE`]. Otherwise
/// the score is `round(100 * common / max(|A|, |B|))` over the distinct
/// label kinds of each side, where `common` is the size of their
/// intersection. Repeated labels count once, so the score is symmetric.
/// Two empty label sets score 0.
#[must_use]
pub fn score(a: Option<&AnalysisResult>, b: Option<&AnalysisResult>) -> ComparisonResult {
    let (Some(a), Some(b)) = (a, b) else {
        return incompatible();
    };
    if !are_compatible(Some(a), Some(b)) {
        return incompatible();
    }

    let kinds_a: BTreeSet<LabelKind> = a.label_kinds().collect();
    let kinds_b: BTreeSet<LabelKind> = b.label_kinds().collect();
    let common = kinds_a.intersection(&kinds_b).count();
    let largest = kinds_a.len().max(kinds_b.len());
    let score = if largest == 0 {
        0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let ratio = common as f64 / largest as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
        percent
    };

    tracing::debug!(common, largest, score, "compared label sets");

    ComparisonResult {
        score,
        reason: format!(
            "similarity based on {common} shared label{}",
            if common == 1 { "" } else { "s" }
        ),
    }
}

fn incompatible() -> ComparisonResult {
    ComparisonResult {
        score: INCOMPATIBLE_SCORE,
        reason: INCOMPATIBLE_REASON.to_string(),
    }
}
