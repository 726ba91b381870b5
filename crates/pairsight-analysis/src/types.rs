//! Shared types for the pairsight analysis pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hand decoded images
/// to [`PixelBuffer::from_rgba_image`] without depending on `image`
/// directly.
pub use image::RgbaImage;

/// Bytes per pixel in a [`PixelBuffer`] (RGBA interleaved).
pub const CHANNELS: usize = 4;

/// An immutable, validated RGBA8 pixel buffer in row-major order.
///
/// The fields are private: once constructed, `data.len()` is guaranteed
/// to equal `width * height * 4` and both dimensions are non-zero, so every
/// coordinate inside `0..width` x `0..height` indexes in bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, checking the length invariant.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroDimension`] if either dimension is zero.
    /// Returns [`AnalysisError::InvalidBuffer`] if `data.len()` is not
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::ZeroDimension { width, height });
        }

        let expected = u64::from(width) * u64::from(height) * CHANNELS as u64;
        let actual = u64::try_from(data.len()).unwrap_or(u64::MAX);
        if expected != actual {
            return Err(AnalysisError::InvalidBuffer {
                width,
                height,
                expected,
                actual,
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take ownership of a decoded [`RgbaImage`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ZeroDimension`] for an empty image.
    pub fn from_rgba_image(image: RgbaImage) -> Result<Self, AnalysisError> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The raw interleaved RGBA bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Total number of pixels (`width * height`).
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// `width / height`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Iterate over the RGB channels of every pixel, alpha dropped.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2]])
    }

    /// RGB channels of the pixel at `(x, y)`.
    ///
    /// Coordinates must be inside the image.
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Unweighted brightness `(R + G + B) / 3` of the pixel at `(x, y)`.
    #[must_use]
    pub fn brightness(&self, x: u32, y: u32) -> f64 {
        let [r, g, b] = self.rgb(x, y);
        (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0
    }
}

/// Mean channel values, each in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

/// Coarse bucket for the average color of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantColor {
    Red,
    Green,
    Blue,
    Gray,
    Mixed,
}

/// Whole-image color statistics.
///
/// `is_grayscale` and `is_colorful` are derived from separate pixel
/// counts against separate ratios; both, either, or neither may hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStats {
    /// Mean R, G and B over all pixels.
    pub average: Rgb,
    /// More than [`AnalysisConfig::grayscale_ratio`] of pixels are near-neutral.
    pub is_grayscale: bool,
    /// More than [`AnalysisConfig::colorful_ratio`] of pixels are chromatic.
    pub is_colorful: bool,
    /// Bucket of the average color.
    pub dominant_color: DominantColor,
}

/// The closed label vocabulary.
///
/// `Building` is never produced by the classifier. It exists because the
/// incompatibility table pairs it with `Portrait`, so results built
/// elsewhere (or deserialized) can carry it.
///
/// Serializes as lowercase text. Deserialization goes through
/// [`FromStr`], so any casing is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LabelKind {
    Landscape,
    Portrait,
    Square,
    Monochrome,
    Colorful,
    Complex,
    Simple,
    Person,
    Architecture,
    Building,
}

impl LabelKind {
    /// Every label, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Landscape,
        Self::Portrait,
        Self::Square,
        Self::Monochrome,
        Self::Colorful,
        Self::Complex,
        Self::Simple,
        Self::Person,
        Self::Architecture,
        Self::Building,
    ];

    /// Lowercase label text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
            Self::Monochrome => "monochrome",
            Self::Colorful => "colorful",
            Self::Complex => "complex",
            Self::Simple => "simple",
            Self::Person => "person",
            Self::Architecture => "architecture",
            Self::Building => "building",
        }
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelKind {
    type Err = AnalysisError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::UnknownLabel(s.to_string()))
    }
}

impl TryFrom<String> for LabelKind {
    type Error = AnalysisError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A semantic label with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Which label.
    pub description: LabelKind,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

/// Primitive shapes the detectors can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
        })
    }
}

/// A detected primitive shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Which shape.
    pub name: ShapeKind,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

/// Compositional features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Fraction of the four thirds intersections that stand out from the
    /// corners, in `[0, 1]`.
    pub rule_of_thirds: f64,
    /// Fraction of mirrored pixel pairs with similar brightness, in `[0, 1]`.
    pub symmetry: f64,
    /// Whether the image center stands out from the corners.
    pub center_focus: bool,
}

/// Everything the pipeline derives from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Semantic labels in detection order. Order carries no meaning.
    pub labels: Vec<Label>,
    /// Detected primitive shapes.
    pub objects: Vec<DetectedObject>,
    /// Compositional features.
    pub composition: Composition,
    /// Color statistics.
    pub colors: ColorStats,
}

impl AnalysisResult {
    /// Returns `true` if any label has the given kind.
    #[must_use]
    pub fn has_label(&self, kind: LabelKind) -> bool {
        self.labels.iter().any(|label| label.description == kind)
    }

    /// Label kinds in detection order.
    pub fn label_kinds(&self) -> impl Iterator<Item = LabelKind> + '_ {
        self.labels.iter().map(|label| label.description)
    }

    /// Returns `true` if a shape of the given kind was detected.
    #[must_use]
    pub fn has_object(&self, kind: ShapeKind) -> bool {
        self.objects.iter().any(|object| object.name == kind)
    }
}

/// Outcome of comparing two analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Similarity percentage, `0..=100`.
    pub score: u8,
    /// Human-readable rationale.
    pub reason: String,
}

/// Tunable thresholds for every heuristic in the pipeline.
///
/// The defaults are the tuned reference values; changing them changes
/// classification results. Missing fields in serialized form fall back
/// to their defaults, so a partial JSON object is a valid override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A pixel is near-neutral when every pair of its channels differs by
    /// less than this.
    pub grayscale_pixel_tolerance: u8,

    /// Fraction of near-neutral pixels above which the image is grayscale.
    pub grayscale_ratio: f64,

    /// Fraction of chromatic pixels above which the image is colorful.
    pub colorful_ratio: f64,

    /// With no strictly dominant channel, the average is `gray` when all
    /// channel differences are below this.
    pub gray_dominant_tolerance: f64,

    /// Aspect ratio above which an image is `landscape`.
    pub landscape_ratio: f64,

    /// Aspect ratio below which an image is `portrait`.
    pub portrait_ratio: f64,

    /// Aspect ratio below which a center-focused image is a `person`.
    pub person_max_ratio: f64,

    /// Aspect ratio above which an image with straight lines is
    /// `architecture`.
    pub architecture_min_ratio: f64,

    /// Complexity above which an image is `complex`.
    pub complex_threshold: f64,

    /// Complexity below which an image is `simple`.
    pub simple_threshold: f64,

    /// Grid spacing of the straight-line detector, and the length of the
    /// run it checks at each grid point.
    pub line_window: u32,

    /// Maximum brightness difference along a run that still counts as
    /// continuous.
    pub line_brightness_tolerance: f64,

    /// A run is a straight line when more than this many of its pixels
    /// are continuous.
    pub line_min_continuity: u32,

    /// Rectangles are reported when straight-line hits exceed
    /// `width * height / line_density_divisor`.
    pub line_density_divisor: f64,

    /// Angular step of the radial symmetry probe, in degrees.
    pub circle_angle_step_degrees: u32,

    /// Maximum brightness difference between opposite probe points.
    pub circle_brightness_tolerance: f64,

    /// Circles are reported when more than this many probes are symmetric.
    pub circle_min_hits: u32,

    /// A point is in focus when it is brighter than the mean of the four
    /// corners by more than this.
    pub focus_margin: f64,

    /// Maximum brightness difference between mirrored pixels.
    pub symmetry_tolerance: f64,

    /// Confidence attached to every label.
    pub label_score: f64,

    /// Confidence attached to every detected shape.
    pub object_score: f64,

    /// Largest accepted width or height. Bounds worst-case latency.
    pub max_dimension: u32,
}

impl AnalysisConfig {
    /// Default [`grayscale_pixel_tolerance`](Self::grayscale_pixel_tolerance).
    pub const DEFAULT_GRAYSCALE_PIXEL_TOLERANCE: u8 = 10;
    /// Default [`grayscale_ratio`](Self::grayscale_ratio).
    pub const DEFAULT_GRAYSCALE_RATIO: f64 = 0.8;
    /// Default [`colorful_ratio`](Self::colorful_ratio).
    pub const DEFAULT_COLORFUL_RATIO: f64 = 0.6;
    /// Default [`gray_dominant_tolerance`](Self::gray_dominant_tolerance).
    pub const DEFAULT_GRAY_DOMINANT_TOLERANCE: f64 = 20.0;
    /// Default [`landscape_ratio`](Self::landscape_ratio).
    pub const DEFAULT_LANDSCAPE_RATIO: f64 = 1.5;
    /// Default [`portrait_ratio`](Self::portrait_ratio).
    pub const DEFAULT_PORTRAIT_RATIO: f64 = 0.8;
    /// Default [`person_max_ratio`](Self::person_max_ratio).
    pub const DEFAULT_PERSON_MAX_RATIO: f64 = 1.0;
    /// Default [`architecture_min_ratio`](Self::architecture_min_ratio).
    pub const DEFAULT_ARCHITECTURE_MIN_RATIO: f64 = 1.2;
    /// Default [`complex_threshold`](Self::complex_threshold).
    pub const DEFAULT_COMPLEX_THRESHOLD: f64 = 0.7;
    /// Default [`simple_threshold`](Self::simple_threshold).
    pub const DEFAULT_SIMPLE_THRESHOLD: f64 = 0.3;
    /// Default [`line_window`](Self::line_window).
    pub const DEFAULT_LINE_WINDOW: u32 = 10;
    /// Default [`line_brightness_tolerance`](Self::line_brightness_tolerance).
    pub const DEFAULT_LINE_BRIGHTNESS_TOLERANCE: f64 = 20.0;
    /// Default [`line_min_continuity`](Self::line_min_continuity).
    pub const DEFAULT_LINE_MIN_CONTINUITY: u32 = 7;
    /// Default [`line_density_divisor`](Self::line_density_divisor).
    pub const DEFAULT_LINE_DENSITY_DIVISOR: f64 = 1000.0;
    /// Default [`circle_angle_step_degrees`](Self::circle_angle_step_degrees).
    pub const DEFAULT_CIRCLE_ANGLE_STEP_DEGREES: u32 = 10;
    /// Default [`circle_brightness_tolerance`](Self::circle_brightness_tolerance).
    pub const DEFAULT_CIRCLE_BRIGHTNESS_TOLERANCE: f64 = 30.0;
    /// Default [`circle_min_hits`](Self::circle_min_hits).
    pub const DEFAULT_CIRCLE_MIN_HITS: u32 = 18;
    /// Default [`focus_margin`](Self::focus_margin).
    pub const DEFAULT_FOCUS_MARGIN: f64 = 20.0;
    /// Default [`symmetry_tolerance`](Self::symmetry_tolerance).
    pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 30.0;
    /// Default [`label_score`](Self::label_score).
    pub const DEFAULT_LABEL_SCORE: f64 = 0.8;
    /// Default [`object_score`](Self::object_score).
    pub const DEFAULT_OBJECT_SCORE: f64 = 0.7;
    /// Default [`max_dimension`](Self::max_dimension).
    pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let unit_fields = [
            ("grayscale_ratio", self.grayscale_ratio),
            ("colorful_ratio", self.colorful_ratio),
            ("complex_threshold", self.complex_threshold),
            ("simple_threshold", self.simple_threshold),
            ("label_score", self.label_score),
            ("object_score", self.object_score),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be in [0, 1], got {value}")));
            }
        }

        let non_negative_fields = [
            ("gray_dominant_tolerance", self.gray_dominant_tolerance),
            ("landscape_ratio", self.landscape_ratio),
            ("portrait_ratio", self.portrait_ratio),
            ("person_max_ratio", self.person_max_ratio),
            ("architecture_min_ratio", self.architecture_min_ratio),
            ("line_brightness_tolerance", self.line_brightness_tolerance),
            ("circle_brightness_tolerance", self.circle_brightness_tolerance),
            ("focus_margin", self.focus_margin),
            ("symmetry_tolerance", self.symmetry_tolerance),
        ];
        for (name, value) in non_negative_fields {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if self.simple_threshold > self.complex_threshold {
            return Err(invalid(format!(
                "simple_threshold ({}) exceeds complex_threshold ({})",
                self.simple_threshold, self.complex_threshold,
            )));
        }
        if self.portrait_ratio > self.landscape_ratio {
            return Err(invalid(format!(
                "portrait_ratio ({}) exceeds landscape_ratio ({})",
                self.portrait_ratio, self.landscape_ratio,
            )));
        }
        if self.line_window == 0 {
            return Err(invalid("line_window must be at least 1".to_string()));
        }
        if !(self.line_density_divisor.is_finite() && self.line_density_divisor > 0.0) {
            return Err(invalid(format!(
                "line_density_divisor must be positive, got {}",
                self.line_density_divisor,
            )));
        }
        if !(1..=360).contains(&self.circle_angle_step_degrees) {
            return Err(invalid(format!(
                "circle_angle_step_degrees must be in 1..=360, got {}",
                self.circle_angle_step_degrees,
            )));
        }
        if self.max_dimension == 0 {
            return Err(invalid("max_dimension must be at least 1".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> AnalysisError {
    AnalysisError::InvalidConfig(message)
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grayscale_pixel_tolerance: Self::DEFAULT_GRAYSCALE_PIXEL_TOLERANCE,
            grayscale_ratio: Self::DEFAULT_GRAYSCALE_RATIO,
            colorful_ratio: Self::DEFAULT_COLORFUL_RATIO,
            gray_dominant_tolerance: Self::DEFAULT_GRAY_DOMINANT_TOLERANCE,
            landscape_ratio: Self::DEFAULT_LANDSCAPE_RATIO,
            portrait_ratio: Self::DEFAULT_PORTRAIT_RATIO,
            person_max_ratio: Self::DEFAULT_PERSON_MAX_RATIO,
            architecture_min_ratio: Self::DEFAULT_ARCHITECTURE_MIN_RATIO,
            complex_threshold: Self::DEFAULT_COMPLEX_THRESHOLD,
            simple_threshold: Self::DEFAULT_SIMPLE_THRESHOLD,
            line_window: Self::DEFAULT_LINE_WINDOW,
            line_brightness_tolerance: Self::DEFAULT_LINE_BRIGHTNESS_TOLERANCE,
            line_min_continuity: Self::DEFAULT_LINE_MIN_CONTINUITY,
            line_density_divisor: Self::DEFAULT_LINE_DENSITY_DIVISOR,
            circle_angle_step_degrees: Self::DEFAULT_CIRCLE_ANGLE_STEP_DEGREES,
            circle_brightness_tolerance: Self::DEFAULT_CIRCLE_BRIGHTNESS_TOLERANCE,
            circle_min_hits: Self::DEFAULT_CIRCLE_MIN_HITS,
            focus_margin: Self::DEFAULT_FOCUS_MARGIN,
            symmetry_tolerance: Self::DEFAULT_SYMMETRY_TOLERANCE,
            label_score: Self::DEFAULT_LABEL_SCORE,
            object_score: Self::DEFAULT_OBJECT_SCORE,
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Errors that can occur before or during analysis.
///
/// Analysis either fully succeeds or refuses with one of these; there are
/// no partial results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Buffer length does not match the declared dimensions.
    #[error("pixel buffer for {width}x{height} must hold {expected} bytes, got {actual}")]
    InvalidBuffer {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// `width * height * 4`.
        expected: u64,
        /// Actual byte count.
        actual: u64,
    },

    /// Width or height is zero.
    #[error("image has zero area ({width}x{height})")]
    ZeroDimension {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// One of the dimensions exceeds [`AnalysisConfig::max_dimension`].
    #[error("image {width}x{height} exceeds the maximum dimension of {max}")]
    TooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Configured limit.
        max: u32,
    },

    /// Analysis configuration is invalid.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),

    /// Label text outside the known vocabulary.
    #[error("unknown label: {0:?}")]
    UnknownLabel(String),
}
