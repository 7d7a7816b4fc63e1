// ABOUTME: Animated GIF path: streams frame headers, enforces budgets, composites frames
// ABOUTME: Frame pixels are only decompressed after the frame passes the pixel budget

use crate::canvas::{resolve_background, Canvas, Disposal, FrameRect, IndexedFrame};
use crate::constants::delays::GIF_DELAY_UNIT;
use crate::error::{DecodeError, Limit};
use crate::frames::{encode_png, Frame, FrameSet};
use crate::limits::DecodeLimits;
use image::Rgba;
use log::{debug, trace};
use std::io::{Cursor, Read};

const GIF_SIGNATURE: &[u8] = b"GIF8";

pub fn is_gif(data: &[u8]) -> bool {
    data.starts_with(GIF_SIGNATURE)
}

/// Frame header fields needed before committing to decompress the frame
struct FrameHeader {
    rect: FrameRect,
    delay_cs: u16,
    disposal: Disposal,
    transparent: Option<u8>,
    palette: Option<Vec<u8>>,
}

struct GifSource<R: Read> {
    decoder: gif::Decoder<R>,
    screen_width: u32,
    screen_height: u32,
    global_palette: Option<Vec<u8>>,
    background: Rgba<u8>,
}

impl<R: Read> GifSource<R> {
    fn new(reader: R) -> Result<Self, DecodeError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::Indexed);
        let decoder = options.read_info(reader)?;

        let global_palette = decoder.global_palette().map(<[u8]>::to_vec);
        let background = resolve_background(global_palette.as_deref(), decoder.bg_color());

        Ok(Self {
            screen_width: u32::from(decoder.width()),
            screen_height: u32::from(decoder.height()),
            global_palette,
            background,
            decoder,
        })
    }

    fn next_header(&mut self) -> Result<Option<FrameHeader>, DecodeError> {
        let Some(frame) = self.decoder.next_frame_info()? else {
            return Ok(None);
        };
        Ok(Some(FrameHeader {
            rect: FrameRect {
                left: u32::from(frame.left),
                top: u32::from(frame.top),
                width: u32::from(frame.width),
                height: u32::from(frame.height),
            },
            delay_cs: frame.delay,
            disposal: frame.dispose.into(),
            transparent: frame.transparent,
            palette: frame.palette.clone(),
        }))
    }

    fn read_indices(&mut self) -> Result<Vec<u8>, DecodeError> {
        let mut indices = vec![0; self.decoder.buffer_size()];
        self.decoder.read_into_buffer(&mut indices)?;
        Ok(indices)
    }
}

/// Decode every GIF frame into a composited PNG, subject to `limits`.
///
/// `limits` must already be normalized. Non-GIF input fails with
/// [`DecodeError::NotAnimated`] without touching the GIF parser.
pub fn decode_gif(data: &[u8], limits: &DecodeLimits) -> Result<FrameSet, DecodeError> {
    if !is_gif(data) {
        return Err(DecodeError::NotAnimated);
    }
    let mut source = GifSource::new(Cursor::new(data))?;

    let Some(first) = source.next_header()? else {
        return Err(DecodeError::NoFrames);
    };
    let (width, height) = canvas_size(source.screen_width, source.screen_height, first.rect)?;
    let mut canvas = Canvas::new(width, height, source.background);
    let frame_pixels = u64::from(width) * u64::from(height);

    let frame_cap = limits.frame_cap();
    let pixel_budget = limits.pixel_budget();
    let mut frames: Vec<Frame> = Vec::new();
    let mut next = Some(first);

    while let Some(header) = next {
        if let Some(budget) = pixel_budget {
            let needed = frame_pixels.saturating_mul(frames.len() as u64 + 1);
            if needed > budget {
                return Err(DecodeError::too_large(Limit::Pixels, budget, needed));
            }
        }

        let indices = source.read_indices()?;
        let palette = header
            .palette
            .as_deref()
            .or(source.global_palette.as_deref())
            .unwrap_or_default();
        let composited = canvas.render(&IndexedFrame {
            rect: header.rect,
            indices: &indices,
            palette,
            transparent: header.transparent,
            disposal: header.disposal,
        });

        let source_delay = GIF_DELAY_UNIT * u32::from(header.delay_cs);
        let delay = limits.resolve_delay(Some(source_delay));
        trace!(
            "frame {}: {:?} delay {}cs -> {:?}",
            frames.len(),
            header.rect,
            header.delay_cs,
            delay
        );
        frames.push(Frame {
            png: encode_png(&composited)?,
            delay,
        });

        if frame_cap.is_some_and(|cap| frames.len() >= cap) {
            debug!("stopping at frame cap of {}", frames.len());
            break;
        }
        next = source.next_header()?;
    }

    FrameSet::new(frames, width, height)
}

/// Logical screen size, falling back to the first frame's far edges when a side is zero
fn canvas_size(
    screen_width: u32,
    screen_height: u32,
    first: FrameRect,
) -> Result<(u32, u32), DecodeError> {
    let (mut width, mut height) = (screen_width, screen_height);
    if width == 0 || height == 0 {
        width = first.right();
        height = first.bottom();
    }
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize { width, height });
    }
    Ok((width, height))
}
