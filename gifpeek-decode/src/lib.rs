// ABOUTME: Frame extraction library turning image bytes into bounded, timed PNG frames
// ABOUTME: Animated GIFs are composited explicitly; other rasters decode as one frame

pub mod animated;
pub mod canvas;
pub mod constants;
pub mod error;
pub mod frames;
pub mod limits;
pub mod reader;
pub mod still;
pub mod stills;

#[cfg(test)]
mod test_helpers;

pub use error::{DecodeError, Limit};
pub use frames::{Frame, FrameSet};
pub use limits::DecodeLimits;
pub use still::probe_dimensions;
pub use stills::{contact_sheet, frame_at_png, frame_index_at, SheetOptions};

use log::debug;
use std::io::Read;

/// Decode an image blob into a frame set.
///
/// Animated GIF decoding is tried first. Other input falls back to a single-frame
/// decode unless `strict_animated_only` is set. Budget violations, empty animations and
/// zero-sized canvases are reported as-is and never retried through the fallback.
pub fn decode(data: &[u8], limits: &DecodeLimits) -> Result<FrameSet, DecodeError> {
    let limits = limits.normalized();

    if let Some(max) = limits.byte_cap() {
        let actual = data.len() as u64;
        if actual > max {
            return Err(DecodeError::too_large(Limit::Bytes, max, actual));
        }
    }

    match animated::decode_gif(data, &limits) {
        Ok(set) => Ok(set),
        Err(err) if err.is_structural() || limits.strict_animated_only => Err(err),
        Err(err) => {
            debug!("animated decode unavailable ({err}), decoding as a single frame");
            still::decode_still(data, &limits)
        }
    }
}

/// Decode from a stream, reading at most `max_bytes + 1` bytes
pub fn decode_reader<R: Read>(reader: R, limits: &DecodeLimits) -> Result<FrameSet, DecodeError> {
    let limits = limits.normalized();
    let data = reader::read_all_limit(reader, limits.byte_cap())?;
    decode(&data, &limits)
}
