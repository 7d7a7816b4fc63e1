// ABOUTME: In-test fixture builders for synthetic GIF and PNG inputs
// ABOUTME: All fixtures use a two-entry black/white palette

use gif::{DisposalMethod, Encoder, Frame};
use image::{ImageFormat, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;

pub const BLACK_WHITE: [u8; 6] = [0, 0, 0, 255, 255, 255];

/// Offset of the background color index in the logical screen descriptor
const BACKGROUND_INDEX_OFFSET: usize = 11;

pub struct FixtureFrame {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub indices: Vec<u8>,
    pub delay_cs: u16,
    pub dispose: DisposalMethod,
}

impl FixtureFrame {
    /// Full 2x2 frame with a single white pixel
    pub fn lit(x: usize, y: usize, delay_cs: u16) -> Self {
        let mut indices = vec![0; 4];
        indices[y * 2 + x] = 1;
        Self {
            left: 0,
            top: 0,
            width: 2,
            height: 2,
            indices,
            delay_cs,
            dispose: DisposalMethod::Keep,
        }
    }
}

pub fn encode_gif(width: u16, height: u16, frames: &[FixtureFrame]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buffer, width, height, &BLACK_WHITE).unwrap();
        for fixture in frames {
            let frame = Frame {
                left: fixture.left,
                top: fixture.top,
                width: fixture.width,
                height: fixture.height,
                delay: fixture.delay_cs,
                dispose: fixture.dispose,
                buffer: Cow::Borrowed(&fixture.indices),
                ..Frame::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }
    buffer
}

/// `count` 2x2 frames with delays of 5, 7, 9... centiseconds
pub fn make_test_gif(count: usize) -> Vec<u8> {
    let frames: Vec<FixtureFrame> = (0..count)
        .map(|i| FixtureFrame::lit(i % 2, i % 2, 5 + 2 * i as u16))
        .collect();
    encode_gif(2, 2, &frames)
}

pub fn make_delay_gif(delays_cs: &[u16]) -> Vec<u8> {
    let frames: Vec<FixtureFrame> = delays_cs
        .iter()
        .enumerate()
        .map(|(i, &delay)| FixtureFrame::lit(i % 2, i % 2, delay))
        .collect();
    encode_gif(2, 2, &frames)
}

/// Frame 0 lights (0,0) and asks for background disposal; frame 1 only covers (1,1)
pub fn make_background_gif(background_index: u8) -> Vec<u8> {
    let mut first = FixtureFrame::lit(0, 0, 5);
    first.dispose = DisposalMethod::Background;
    let second = FixtureFrame {
        left: 1,
        top: 1,
        width: 1,
        height: 1,
        indices: vec![1],
        delay_cs: 5,
        dispose: DisposalMethod::Keep,
    };
    let mut data = encode_gif(2, 2, &[first, second]);
    data[BACKGROUND_INDEX_OFFSET] = background_index;
    data
}

/// Frame 0 lights (0,0); frame 1 fills the canvas white and asks to be undone;
/// frame 2 only covers (1,1)
pub fn make_previous_gif() -> Vec<u8> {
    let first = FixtureFrame::lit(0, 0, 5);
    let mut second = FixtureFrame::lit(0, 0, 5);
    second.indices = vec![1; 4];
    second.dispose = DisposalMethod::Previous;
    let third = FixtureFrame {
        left: 1,
        top: 1,
        width: 1,
        height: 1,
        indices: vec![1],
        delay_cs: 5,
        dispose: DisposalMethod::Keep,
    };
    encode_gif(2, 2, &[first, second, third])
}

pub fn empty_gif() -> Vec<u8> {
    encode_gif(2, 2, &[])
}

pub fn make_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::new(width, height);
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn rgba_at(png: &[u8], x: u32, y: u32) -> [u8; 4] {
    image::load_from_memory(png)
        .unwrap()
        .to_rgba8()
        .get_pixel(x, y)
        .0
}
