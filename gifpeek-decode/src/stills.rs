// ABOUTME: Still extraction and contact sheets built from a decoded FrameSet
// ABOUTME: Frames are picked by timestamp and sampled evenly across the animation

use crate::constants::limits;
use crate::error::DecodeError;
use crate::frames::{encode_png, Frame, FrameSet};
use image::{imageops, Rgba, RgbaImage};
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Index of the frame visible `at` into the animation.
///
/// Timestamps before the start select the first frame and timestamps past the end
/// select the last. An animation without duration always shows its first frame.
pub fn frame_index_at(frames: &[Frame], at: Duration) -> Result<usize, DecodeError> {
    if frames.is_empty() {
        return Err(DecodeError::NoFrames);
    }
    let total: Duration = frames.iter().map(|f| f.delay).sum();
    if total.is_zero() {
        return Ok(0);
    }

    let mut elapsed = Duration::ZERO;
    for (index, frame) in frames.iter().enumerate() {
        elapsed += frame.delay;
        if at < elapsed {
            return Ok(index);
        }
    }
    Ok(frames.len() - 1)
}

/// PNG bytes and index of the frame visible `at` into the animation
pub fn frame_at_png(set: &FrameSet, at: Duration) -> Result<(&[u8], usize), DecodeError> {
    let index = frame_index_at(set.frames(), at)?;
    Ok((&set.frames()[index].png, index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct SheetOptions {
    /// Frames to sample; clamped to the frame count, must be positive
    #[builder(default = 12)]
    pub count: i64,

    /// Tiles per row, `0` picks a near-square grid
    #[builder(default = 0)]
    pub columns: i64,

    /// Gap between tiles in pixels; negative values mean none
    #[builder(default = 2)]
    pub padding: i64,

    #[builder(default = Rgba([0, 0, 0, 0]))]
    pub background: Rgba<u8>,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions::builder().build()
    }
}

/// Lay out evenly sampled frames in a grid and encode the result as PNG
pub fn contact_sheet(set: &FrameSet, options: &SheetOptions) -> Result<Vec<u8>, DecodeError> {
    if options.count <= 0 {
        return Err(DecodeError::InvalidCount);
    }
    let count = (options.count as usize).min(set.len());
    let columns = if options.columns > 0 {
        usize::try_from(options.columns).unwrap_or(count).min(count)
    } else {
        (count as f64).sqrt().ceil() as usize
    };
    let rows = count.div_ceil(columns);

    let (tile_w, tile_h) = tile_size(set)?;
    let padding = u64::try_from(options.padding).unwrap_or(0);
    let (sheet_w, sheet_h) = sheet_size((tile_w, tile_h), (columns, rows), padding)?;
    let mut sheet = RgbaImage::from_pixel(sheet_w, sheet_h, options.background);

    for (slot, index) in sample_indices(set.frames(), count).into_iter().enumerate() {
        let tile = image::load_from_memory(&set.frames()[index].png)?.to_rgba8();
        let col = (slot % columns) as u64;
        let row = (slot / columns) as u64;
        // Bounded by the sheet size checked above
        let x = col * (u64::from(tile_w) + padding);
        let y = row * (u64::from(tile_h) + padding);
        imageops::overlay(&mut sheet, &tile, x as i64, y as i64);
    }

    encode_png(&sheet)
}

/// Pixel size of a `columns` x `rows` grid, refused when it cannot be allocated
fn sheet_size(tile: (u32, u32), grid: (usize, usize), padding: u64) -> Result<(u32, u32), DecodeError> {
    let span = |tile: u32, n: usize| -> Option<u64> {
        let n = n as u64;
        u64::from(tile)
            .checked_mul(n)?
            .checked_add(padding.checked_mul(n.saturating_sub(1))?)
    };
    let too_large = |width: u64, height: u64| DecodeError::SheetTooLarge {
        width,
        height,
        max: limits::MAX_SHEET_PIXELS,
    };

    let (Some(width), Some(height)) = (span(tile.0, grid.0), span(tile.1, grid.1)) else {
        return Err(too_large(u64::MAX, u64::MAX));
    };
    let within = width
        .checked_mul(height)
        .is_some_and(|pixels| pixels <= limits::MAX_SHEET_PIXELS);
    if !within {
        return Err(too_large(width, height));
    }
    // The pixel cap keeps both sides well inside u32
    Ok((width as u32, height as u32))
}

fn tile_size(set: &FrameSet) -> Result<(u32, u32), DecodeError> {
    let (mut width, mut height) = (set.width(), set.height());
    if width == 0 || height == 0 {
        let first = image::load_from_memory(&set.first().png)?;
        width = first.width();
        height = first.height();
    }
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize { width, height });
    }
    Ok((width, height))
}

/// `count` frame indices spread across the animation's duration, or across the
/// frame list when the animation has no duration
fn sample_indices(frames: &[Frame], count: usize) -> Vec<usize> {
    if count == 0 || frames.is_empty() {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }

    let total: Duration = frames.iter().map(|f| f.delay).sum();
    let steps = (count - 1) as f64;
    if total.is_zero() {
        let last = (frames.len() - 1) as f64;
        return (0..count)
            .map(|i| (last * i as f64 / steps).round() as usize)
            .collect();
    }

    (0..count)
        .map(|i| {
            let at = total.mul_f64(i as f64 / steps);
            frame_index_at(frames, at).unwrap_or(0)
        })
        .collect()
}
