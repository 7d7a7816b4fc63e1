// ABOUTME: Logical-screen compositing for palette-indexed animation frames
// ABOUTME: Applies per-frame disposal (none / restore background / restore previous)

use image::{Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How the canvas is prepared once a frame has been shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// Leave the frame's pixels in place
    #[default]
    None,
    /// Clear the frame's region to the background color
    Background,
    /// Restore the canvas to what it was before the frame was drawn
    Previous,
}

impl From<gif::DisposalMethod> for Disposal {
    fn from(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Any | gif::DisposalMethod::Keep => Disposal::None,
            gif::DisposalMethod::Background => Disposal::Background,
            gif::DisposalMethod::Previous => Disposal::Previous,
        }
    }
}

/// Placement of a frame on the logical screen, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// A frame's raw palette indices plus everything needed to paint them
#[derive(Debug, Clone, Copy)]
pub struct IndexedFrame<'a> {
    pub rect: FrameRect,
    /// Row-major, `rect.width * rect.height` entries
    pub indices: &'a [u8],
    /// RGB triples
    pub palette: &'a [u8],
    pub transparent: Option<u8>,
    pub disposal: Disposal,
}

pub struct Canvas {
    pixels: RgbaImage,
    background: Rgba<u8>,
}

impl Canvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            background,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    /// Draw `frame`, return the composited image, then dispose the frame so the
    /// canvas is ready for the next one.
    pub fn render(&mut self, frame: &IndexedFrame<'_>) -> RgbaImage {
        let saved = (frame.disposal == Disposal::Previous).then(|| self.pixels.clone());

        self.draw(frame);
        let composited = self.pixels.clone();

        match frame.disposal {
            Disposal::None => {}
            Disposal::Background => self.fill(frame.rect, self.background),
            Disposal::Previous => {
                if let Some(saved) = saved {
                    self.pixels = saved;
                }
            }
        }

        composited
    }

    fn draw(&mut self, frame: &IndexedFrame<'_>) {
        let (canvas_w, canvas_h) = self.pixels.dimensions();
        let rect = frame.rect;

        for y in 0..rect.height {
            let cy = rect.top + y;
            if cy >= canvas_h {
                break;
            }
            for x in 0..rect.width {
                let cx = rect.left + x;
                if cx >= canvas_w {
                    break;
                }
                let offset = (y as usize) * (rect.width as usize) + x as usize;
                let Some(&index) = frame.indices.get(offset) else {
                    return;
                };
                if frame.transparent == Some(index) {
                    continue;
                }
                if let Some(color) = palette_color(frame.palette, index as usize) {
                    self.pixels.put_pixel(cx, cy, color);
                }
            }
        }
    }

    fn fill(&mut self, rect: FrameRect, color: Rgba<u8>) {
        let (canvas_w, canvas_h) = self.pixels.dimensions();
        for cy in rect.top..rect.bottom().min(canvas_h) {
            for cx in rect.left..rect.right().min(canvas_w) {
                self.pixels.put_pixel(cx, cy, color);
            }
        }
    }
}

/// Opaque background color from the global palette, or transparent when the palette
/// is missing or the index falls outside it.
pub fn resolve_background(global_palette: Option<&[u8]>, index: Option<usize>) -> Rgba<u8> {
    match (global_palette, index) {
        (Some(palette), Some(index)) => palette_color(palette, index).unwrap_or(TRANSPARENT),
        _ => TRANSPARENT,
    }
}

fn palette_color(palette: &[u8], index: usize) -> Option<Rgba<u8>> {
    let base = index.checked_mul(3)?;
    let rgb = palette.get(base..base + 3)?;
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}
