//! Integration tests: synthetic images through the public analysis and
//! comparison API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pairsight_analysis::{
    AnalysisConfig, AnalysisError, AnalysisResult, Label, LabelKind, PixelBuffer, RgbaImage,
    analyze, compare, similarity,
};

fn gray(v: u8) -> image::Rgba<u8> {
    image::Rgba([v, v, v, 255])
}

/// Tall frame, dark background, bright figure in the middle.
fn portrait_of_person() -> PixelBuffer {
    let img = RgbaImage::from_fn(60, 100, |x, y| {
        let dx = f64::from(x) - 30.0;
        let dy = f64::from(y) - 50.0;
        if (dx / 15.0).hypot(dy / 30.0) < 1.0 {
            gray(230)
        } else {
            gray(15)
        }
    });
    PixelBuffer::from_rgba_image(img).unwrap()
}

/// Wide frame of flat horizontal bands.
fn facade() -> PixelBuffer {
    let img = RgbaImage::from_fn(300, 120, |_, y| if (y / 20) % 2 == 0 { gray(60) } else { gray(180) });
    PixelBuffer::from_rgba_image(img).unwrap()
}

#[test]
fn person_portrait_labels() {
    let result = analyze(&portrait_of_person()).unwrap();
    for kind in [
        LabelKind::Portrait,
        LabelKind::Monochrome,
        LabelKind::Simple,
        LabelKind::Person,
    ] {
        assert!(result.has_label(kind), "missing {kind}: {:?}", result.labels);
    }
    assert!(result.composition.center_focus);
}

#[test]
fn facade_labels() {
    let result = analyze(&facade()).unwrap();
    assert!(result.has_label(LabelKind::Landscape));
    assert!(result.has_label(LabelKind::Architecture));
    assert!(!result.has_label(LabelKind::Person));
}

#[test]
fn person_and_architecture_are_incompatible_both_ways() {
    let person = analyze(&portrait_of_person()).unwrap();
    let building = analyze(&facade()).unwrap();

    let forward = compare(&person, &building);
    let backward = compare(&building, &person);
    assert_eq!(forward.score, similarity::INCOMPATIBLE_SCORE);
    assert_eq!(backward.score, similarity::INCOMPATIBLE_SCORE);
    assert_eq!(forward.reason, similarity::INCOMPATIBLE_REASON);
    assert_eq!(forward, backward);
}

#[test]
fn compatible_scores_are_symmetric() {
    let a = analyze(&facade()).unwrap();
    let b = PixelBuffer::from_rgba_image(RgbaImage::from_fn(200, 100, |x, _| {
        gray(u8::try_from(x).unwrap())
    }))
    .unwrap();
    let b = analyze(&b).unwrap();
    assert!(similarity::are_compatible(Some(&a), Some(&b)));
    assert_eq!(compare(&a, &b).score, compare(&b, &a).score);
}

#[test]
fn repeated_labels_from_json_score_symmetrically() {
    let mut doubled = analyze(&facade()).unwrap();
    doubled.labels.truncate(1);
    let json = serde_json::to_string(&doubled).unwrap();
    let mut doubled: AnalysisResult = serde_json::from_str(&json).unwrap();
    doubled.labels.push(doubled.labels[0]);

    let mut other = doubled.clone();
    other.labels.truncate(1);
    other.labels.push(Label {
        description: LabelKind::Simple,
        score: 0.6,
    });

    let forward = compare(&doubled, &other);
    let backward = compare(&other, &doubled);
    assert_eq!(forward, backward);
    assert_eq!(forward.score, 50);
}

#[test]
fn raw_buffer_validation() {
    let err = PixelBuffer::new(4, 4, vec![0; 63]).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidBuffer { expected: 64, actual: 63, .. }));

    let ok = PixelBuffer::new(4, 4, vec![0; 64]).unwrap();
    assert!(analyze(&ok).is_ok());
}

#[test]
fn analysis_result_json_round_trip() {
    let result = analyze(&portrait_of_person()).unwrap();
    let json = serde_json::to_string_pretty(&result).unwrap();
    assert!(json.contains("\"person\""));
    assert!(json.contains("\"dominant_color\": \"gray\""));
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn config_json_override_changes_labels() {
    let buffer = portrait_of_person();
    let config: AnalysisConfig = serde_json::from_str(r#"{"focus_margin": 250.0}"#).unwrap();
    let result = pairsight_analysis::analyze_with_config(&buffer, &config).unwrap();
    assert!(!result.has_label(LabelKind::Person));
}

#[test]
fn buffers_analyze_independently_across_threads() {
    let buffers = [portrait_of_person(), facade()];
    let expected: Vec<_> = buffers.iter().map(|b| analyze(b).unwrap()).collect();

    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = buffers
            .iter()
            .map(|b| scope.spawn(move || analyze(b).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(parallel, expected);
}
