// ABOUTME: iTerm2 inline file protocol encoder
// ABOUTME: Sends a whole file in one OSC 1337 sequence; playback is left to the terminal

use crate::constants::protocol::DEFAULT_INLINE_NAME;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::io::{self, Write};

/// One inline file transmission; zero width/height let the terminal choose
#[derive(Debug, Clone, Copy)]
pub struct InlineFile<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub width_cells: u16,
    pub height_cells: u16,
}

/// Emit the inline file sequence; an empty payload emits nothing
pub fn send_inline_file<W: Write>(out: &mut W, file: &InlineFile<'_>) -> io::Result<()> {
    if file.data.is_empty() {
        return Ok(());
    }

    let mut args = vec![
        format!("name={}", STANDARD.encode(inline_name(file.name))),
        format!("size={}", file.data.len()),
        "inline=1".to_string(),
        "preserveAspectRatio=1".to_string(),
    ];
    if file.width_cells > 0 {
        args.push(format!("width={}", file.width_cells));
    }
    if file.height_cells > 0 {
        args.push(format!("height={}", file.height_cells));
    }

    write!(
        out,
        "\x1b]1337;File={}:{}\x1b\\",
        args.join(";"),
        STANDARD.encode(file.data)
    )
}

/// Base name sent to the terminal; blank names fall back to a generic one
fn inline_name(name: &str) -> &str {
    let trimmed = name.trim();
    let base = trimmed
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    if base.is_empty() { DEFAULT_INLINE_NAME } else { base }
}

/// Extract a reasonable filename from a URL or path for the name parameter
pub fn extract_filename_from_url(url: &str) -> String {
    let path_part = url.rsplit('/').next().unwrap_or(url);
    let clean_name = path_part
        .split(['?', '#'])
        .next()
        .unwrap_or(path_part);

    if clean_name.is_empty() {
        DEFAULT_INLINE_NAME.to_string()
    } else {
        clean_name.to_string()
    }
}
