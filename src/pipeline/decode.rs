//! Image decoding: data-URI payload → `DynamicImage`.
//!
//! The drawing page submits `canvas.toDataURL("image/png")`, i.e.
//! `data:image/png;base64,iVBOR…`. Everything before the first comma is
//! presentation metadata we do not need — the bytes after it are the image.
//! Payloads without a comma are treated as bare base64, so API callers can
//! skip the data-URI wrapping entirely.

use crate::error::SnapsolveError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use tracing::debug;

/// Maximum accepted image payload after base64 decoding (10 MB).
///
/// A canvas sketch is a few kilobytes; phone photos top out around 5 MB.
/// Anything larger is not a math expression.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Decode a data-URI (or bare base64) payload into a bitmap.
///
/// # Errors
/// [`SnapsolveError::ImageDecode`] when the payload is empty, not valid
/// base64, oversized, or not a decodable PNG/JPEG.
pub fn decode_data_uri(payload: &str) -> Result<DynamicImage, SnapsolveError> {
    if payload.trim().is_empty() {
        return Err(SnapsolveError::ImageDecode {
            reason: "empty image data".into(),
        });
    }

    // `data:image/png;base64,AAAA…` → keep what follows the first comma.
    let b64 = match payload.split_once(',') {
        Some((_meta, rest)) => rest,
        None => payload,
    };

    // Data-URIs copied out of HTML sources often arrive line-wrapped; the
    // base64 alphabet never contains whitespace, so stripping it is safe.
    let compact: String = b64.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SnapsolveError::ImageDecode {
            reason: format!("invalid base64: {e}"),
        })?;

    if bytes.is_empty() {
        return Err(SnapsolveError::ImageDecode {
            reason: "empty image data".into(),
        });
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(SnapsolveError::ImageDecode {
            reason: format!(
                "image too large: {} bytes (max {} bytes)",
                bytes.len(),
                MAX_IMAGE_BYTES
            ),
        });
    }

    let img = image::load_from_memory(&bytes).map_err(|e| SnapsolveError::ImageDecode {
        reason: e.to_string(),
    })?;

    debug!(
        "Decoded image: {}x{} px from {} base64 chars",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Build a real in-memory PNG and return it as a data-URI.
    fn tiny_png_data_uri() -> String {
        let img = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(buf.get_ref()))
    }

    #[test]
    fn decodes_data_uri_payload() {
        let img = decode_data_uri(&tiny_png_data_uri()).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn decodes_bare_base64_without_prefix() {
        let uri = tiny_png_data_uri();
        let bare = uri.split_once(',').unwrap().1;
        let img = decode_data_uri(bare).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn tolerates_line_wrapped_base64() {
        let uri = tiny_png_data_uri();
        let (meta, b64) = uri.split_once(',').unwrap();
        let mut wrapped = String::new();
        for chunk in b64.as_bytes().chunks(16) {
            wrapped.push_str(std::str::from_utf8(chunk).unwrap());
            wrapped.push('\n');
        }
        let img = decode_data_uri(&format!("{meta},{wrapped}")).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[test]
    fn rejects_empty_payload() {
        let err = decode_data_uri("   ").unwrap_err();
        assert!(matches!(err, SnapsolveError::ImageDecode { .. }));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_data_uri("data:image/png;base64,!!!not-base64!!!").unwrap_err();
        match err {
            SnapsolveError::ImageDecode { reason } => {
                assert!(reason.contains("base64"), "got: {reason}")
            }
            other => panic!("expected ImageDecode, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_image_bytes() {
        let payload = STANDARD.encode(b"definitely not a PNG");
        let err = decode_data_uri(&payload).unwrap_err();
        assert!(matches!(err, SnapsolveError::ImageDecode { .. }));
    }

    #[test]
    fn metadata_before_comma_is_ignored() {
        let uri = tiny_png_data_uri();
        let b64 = uri.split_once(',').unwrap().1;
        // Bogus media type: only the payload after the comma matters.
        let img = decode_data_uri(&format!("data:application/x-whatever;base64,{b64}")).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }
}
