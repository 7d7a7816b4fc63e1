// ABOUTME: Non-interactive extraction commands: still frame, contact sheet and info
// ABOUTME: Every fetch or decode failure is surfaced as a failure of the whole command

use crate::image_protocols::Fetcher;
use crate::output::ImageInfo;
use anyhow::{Context, Result};
use gifpeek_decode::{DecodeLimits, FrameSet, SheetOptions, contact_sheet, frame_at_png};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Output target meaning standard output
pub const STDOUT: &str = "-";

/// Fetch and decode one source
pub async fn load_frames<F: Fetcher + ?Sized>(fetcher: &F, source: &str, limits: &DecodeLimits) -> Result<FrameSet> {
    let bytes = fetcher
        .fetch(source)
        .await
        .with_context(|| format!("Failed to fetch {source}"))?;
    let set = gifpeek_decode::decode(&bytes, limits).with_context(|| format!("Failed to decode {source}"))?;
    log::debug!(
        "{source}: {} frame(s) at {}x{}",
        set.len(),
        set.width(),
        set.height()
    );
    Ok(set)
}

/// Write the frame visible at `at`; returns its index
pub async fn still<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: &str,
    at: Duration,
    output: &str,
    limits: &DecodeLimits,
) -> Result<usize> {
    let set = load_frames(fetcher, source, limits).await?;
    let (png, index) = frame_at_png(&set, at)?;
    write_output(output, png)?;
    Ok(index)
}

/// Write a contact sheet PNG
pub async fn sheet<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: &str,
    options: &SheetOptions,
    output: &str,
    limits: &DecodeLimits,
) -> Result<()> {
    let set = load_frames(fetcher, source, limits).await?;
    let png = contact_sheet(&set, options).context("Failed to build contact sheet")?;
    write_output(output, &png)
}

pub async fn info<F: Fetcher + ?Sized>(fetcher: &F, source: &str, limits: &DecodeLimits) -> Result<ImageInfo> {
    let set = load_frames(fetcher, source, limits).await?;
    Ok(ImageInfo::from_frames(source, &set))
}

/// Write to a file, or to stdout when `output` is "-"
pub fn write_output(output: &str, data: &[u8]) -> Result<()> {
    if output == STDOUT {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(data).context("Failed to write to stdout")?;
        stdout.flush().context("Failed to write to stdout")?;
        return Ok(());
    }

    let path = Path::new(output);
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
