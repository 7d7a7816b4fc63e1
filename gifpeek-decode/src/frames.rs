// ABOUTME: Normalized decode output: self-contained PNG frames with display delays
// ABOUTME: A FrameSet is immutable once built and always holds at least one frame

use crate::error::DecodeError;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::time::Duration;

/// One displayable still, encoded as a standalone PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub png: Vec<u8>,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
}

impl FrameSet {
    /// Build a frame set, rejecting an empty frame list
    pub fn new(frames: Vec<Frame>, width: u32, height: u32) -> Result<Self, DecodeError> {
        if frames.is_empty() {
            return Err(DecodeError::NoFrames);
        }
        Ok(Self {
            frames,
            width,
            height,
        })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn first(&self) -> &Frame {
        // Non-empty by construction
        &self.frames[0]
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|f| f.delay).sum()
    }
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
