// ABOUTME: Single-frame fallback for raster formats without animation support
// ABOUTME: Checks header dimensions against the pixel budget before decoding pixels

use crate::error::{DecodeError, Limit};
use crate::frames::{encode_png, Frame, FrameSet};
use crate::limits::DecodeLimits;
use image::ImageReader;
use std::io::Cursor;

/// Pixel size read from the image header only
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), DecodeError> {
    let dimensions = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Decode any supported raster format into a one-frame set using the default delay.
///
/// `limits` must already be normalized.
pub fn decode_still(data: &[u8], limits: &DecodeLimits) -> Result<FrameSet, DecodeError> {
    let (width, height) = probe_dimensions(data)?;
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize { width, height });
    }
    if let Some(budget) = limits.pixel_budget() {
        let needed = u64::from(width) * u64::from(height);
        if needed > budget {
            return Err(DecodeError::too_large(Limit::Pixels, budget, needed));
        }
    }

    let image = image::load_from_memory(data)?.to_rgba8();
    let frame = Frame {
        png: encode_png(&image)?,
        delay: limits.resolve_delay(None),
    };
    FrameSet::new(vec![frame], image.width(), image.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_png, make_test_gif};

    #[test]
    fn test_probe_dimensions_png_and_gif() {
        assert_eq!(probe_dimensions(&make_png(3, 4)).unwrap(), (3, 4));
        assert_eq!(probe_dimensions(&make_test_gif(2)).unwrap(), (2, 2));
    }

    #[test]
    fn test_probe_unknown_format_fails() {
        assert!(probe_dimensions(b"nope").is_err());
    }

    #[test]
    fn test_still_uses_default_delay() {
        let limits = DecodeLimits::default();
        let set = decode_still(&make_png(3, 4), &limits).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!((set.width(), set.height()), (3, 4));
        assert_eq!(set.first().delay, limits.default_delay);
    }

    #[test]
    fn test_still_over_budget() {
        let limits = DecodeLimits::builder().max_pixels(1).build();
        assert!(matches!(
            decode_still(&make_png(2, 2), &limits),
            Err(DecodeError::TooLarge {
                limit: Limit::Pixels,
                ..
            })
        ));
    }
}
