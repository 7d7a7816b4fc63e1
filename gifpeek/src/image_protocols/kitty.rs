// ABOUTME: Kitty terminal graphics protocol encoder with native animation support
// ABOUTME: Handles base64 encoding and chunking for the Kitty graphics protocol

use super::protocol_delay_ms;
use crate::constants::protocol::{CHUNK_SIZE, PLACEMENT_ID};
use base64::{Engine, engine::general_purpose::STANDARD};
use gifpeek_decode::Frame;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Transmit and display
    Transmit,
    /// Add an animation frame
    Frame,
}

impl Action {
    fn key(self) -> char {
        match self {
            Action::Transmit => 'T',
            Action::Frame => 'f',
        }
    }
}

/// One chunked image payload and the parameters of its first control sequence
struct Payload<'a> {
    action: Action,
    id: u32,
    data: &'a [u8],
    cols: u16,
    rows: u16,
    placement: u32,
    no_cursor_move: bool,
    delay: Option<Duration>,
}

impl Payload<'_> {
    fn first_params(&self, more: bool) -> String {
        let mut params = vec![
            format!("a={}", self.action.key()),
            "f=100".to_string(),
            format!("i={}", self.id),
            format!("m={}", u8::from(more)),
            "q=2".to_string(),
        ];
        if self.cols > 0 {
            params.push(format!("c={}", self.cols));
        }
        if self.rows > 0 {
            params.push(format!("r={}", self.rows));
        }
        if self.placement > 0 {
            params.push(format!("p={}", self.placement));
        }
        if self.no_cursor_move {
            params.push("C=1".to_string());
        }
        if let (Action::Frame, Some(delay)) = (self.action, self.delay.filter(|d| !d.is_zero())) {
            params.push(format!("z={}", protocol_delay_ms(delay)));
        }
        params.join(",")
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let encoded = STANDARD.encode(self.data);
        let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(CHUNK_SIZE).collect();

        for (i, chunk) in chunks.iter().enumerate() {
            let more = i + 1 < chunks.len();
            if i == 0 {
                write!(out, "\x1b_G{};", self.first_params(more))?;
            } else if self.action == Action::Frame {
                write!(out, "\x1b_Ga=f,m={};", u8::from(more))?;
            } else {
                write!(out, "\x1b_Gm={};", u8::from(more))?;
            }
            out.write_all(chunk)?;
            out.write_all(b"\x1b\\")?;
        }
        Ok(())
    }
}

/// Transmit `data` as image `id` and display it at the cursor without moving it
pub fn transmit<W: Write>(
    out: &mut W,
    id: u32,
    data: &[u8],
    cols: u16,
    rows: u16,
    placement: u32,
) -> io::Result<()> {
    Payload {
        action: Action::Transmit,
        id,
        data,
        cols,
        rows,
        placement,
        no_cursor_move: true,
        delay: None,
    }
    .write_to(out)
}

/// Append an animation frame to image `id`
pub fn append_frame<W: Write>(out: &mut W, id: u32, data: &[u8], delay: Duration) -> io::Result<()> {
    Payload {
        action: Action::Frame,
        id,
        data,
        cols: 0,
        rows: 0,
        placement: 0,
        no_cursor_move: false,
        delay: Some(delay),
    }
    .write_to(out)
}

/// Set the gap of the root frame; non-positive delays emit nothing
pub fn set_animation_delay<W: Write>(out: &mut W, id: u32, delay_ms: i64) -> io::Result<()> {
    if delay_ms <= 0 {
        return Ok(());
    }
    write!(out, "\x1b_Ga=a,i={id},r=1,z={delay_ms},q=2\x1b\\")
}

/// Start looping the animation forever
pub fn start_animation<W: Write>(out: &mut W, id: u32) -> io::Result<()> {
    write!(out, "\x1b_Ga=a,i={id},s=3,v=1,q=2\x1b\\")
}

/// Re-place an already transmitted image at the cursor
pub fn place<W: Write>(out: &mut W, id: u32, cols: u16, rows: u16) -> io::Result<()> {
    if id == 0 {
        return Ok(());
    }
    write!(
        out,
        "\x1b_Ga=p,i={id},p={PLACEMENT_ID},c={cols},r={rows},C=1,q=2\x1b\\"
    )
}

/// Delete image `id` and free its data
pub fn delete<W: Write>(out: &mut W, id: u32) -> io::Result<()> {
    if id == 0 {
        return Ok(());
    }
    write!(out, "\x1b_Ga=d,d=I,i={id},q=2\x1b\\")
}

/// Transmit a whole animation and hand playback to the terminal
pub fn send_animation<W: Write>(
    out: &mut W,
    id: u32,
    frames: &[Frame],
    cols: u16,
    rows: u16,
) -> io::Result<()> {
    let Some((base, rest)) = frames.split_first() else {
        return Ok(());
    };
    transmit(out, id, &base.png, cols, rows, PLACEMENT_ID)?;
    for frame in rest {
        append_frame(out, id, &frame.png, frame.delay)?;
    }
    set_animation_delay(out, id, i64::from(protocol_delay_ms(base.delay)))?;
    start_animation(out, id)
}

/// Transmit a single frame as the whole image, used when the client drives playback
pub fn send_frame<W: Write>(out: &mut W, id: u32, frame: &Frame, cols: u16, rows: u16) -> io::Result<()> {
    transmit(out, id, &frame.png, cols, rows, PLACEMENT_ID)
}
