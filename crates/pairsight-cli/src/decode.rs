//! Image decoding: file bytes in, validated [`PixelBuffer`] out.
//!
//! The analysis crate never decodes; this is the platform side of that
//! boundary. Supports whatever the workspace `image` features enable
//! (PNG, JPEG, BMP, WebP).

use std::path::Path;

use pairsight_analysis::{AnalysisError, PixelBuffer};

/// Errors produced while turning a file into a pixel buffer.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file could not be read. Callers attach the path.
    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),

    /// The file was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// The decoded image cannot be analyzed (e.g. zero area).
    #[error(transparent)]
    Buffer(#[from] AnalysisError),
}

/// Decode in-memory image bytes to RGBA8.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if `bytes` is empty.
/// Returns [`DecodeError::Image`] if the format is unrecognized or the data
/// is corrupt.
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(PixelBuffer::from_rgba_image(rgba)?)
}

/// Read and decode an image file.
///
/// # Errors
///
/// Returns [`DecodeError::Read`] if the file cannot be read, otherwise the
/// errors of [`decode_bytes`].
pub fn load(path: &Path) -> Result<PixelBuffer, DecodeError> {
    let bytes = std::fs::read(path).map_err(DecodeError::Read)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read image");
    decode_bytes(&bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode an RGBA image as PNG bytes.
    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode_bytes(&[]), Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_error() {
        let result = decode_bytes(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[test]
    fn png_decodes_to_matching_buffer() {
        let img = image::RgbaImage::from_fn(17, 31, |x, y| {
            image::Rgba([u8::try_from(x).unwrap(), u8::try_from(y).unwrap(), 7, 255])
        });
        let buffer = decode_bytes(&encode_png(&img)).unwrap();
        assert_eq!(buffer.width(), 17);
        assert_eq!(buffer.height(), 31);
        assert_eq!(buffer.rgb(16, 30), [16, 30, 7]);
        assert_eq!(buffer.data(), img.as_raw().as_slice());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, DecodeError::Read(_)));
        assert!(err.to_string().starts_with("failed to read file: "));
        assert!(!err.to_string().contains("here.png"));
    }
}
