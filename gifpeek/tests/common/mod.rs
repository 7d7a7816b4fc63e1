// ABOUTME: Shared fixtures for integration tests: tiny GIFs synthesised in memory
// ABOUTME: Frames alternate between black and white so composited output is easy to check

#![allow(dead_code)]

use std::borrow::Cow;

const BLACK_WHITE: [u8; 6] = [0, 0, 0, 255, 255, 255];

/// A 2x2 GIF with `frames` full-canvas frames of `delay_cs` hundredths of a second
pub fn make_gif(frames: usize, delay_cs: u16) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut buffer, 2, 2, &BLACK_WHITE).unwrap();
        for i in 0..frames {
            let frame = gif::Frame {
                width: 2,
                height: 2,
                delay: delay_cs,
                buffer: Cow::Owned(vec![(i % 2) as u8; 4]),
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }
    buffer
}

pub fn count(haystack: &[u8], needle: &str) -> usize {
    String::from_utf8_lossy(haystack).matches(needle).count()
}
