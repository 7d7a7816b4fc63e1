// ABOUTME: End-to-end tests for the still, sheet and info commands against local files
// ABOUTME: Runs the real fetcher and decoder on synthesised GIFs written to a temp directory

mod common;

use common::make_gif;
use gifpeek::extract;
use gifpeek::image_protocols::ImageFetcher;
use gifpeek_decode::{DecodeLimits, SheetOptions};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn fetcher() -> ImageFetcher {
    ImageFetcher::new(Duration::from_secs(5), None).expect("Should build fetcher")
}

fn write_gif(dir: &TempDir, frames: usize) -> String {
    let path = dir.path().join("input.gif");
    std::fs::write(&path, make_gif(frames, 5)).expect("Should write fixture");
    path.to_string_lossy().to_string()
}

fn png_size(path: &Path) -> (u32, u32) {
    let bytes = std::fs::read(path).expect("Should read output");
    let image = image::load_from_memory(&bytes).expect("Output should be a valid image");
    (image.width(), image.height())
}

#[tokio::test]
async fn test_still_picks_frame_by_timestamp() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 3);
    let output = dir.path().join("still.png");
    let output_str = output.to_string_lossy().to_string();

    let limits = DecodeLimits::default();
    // Frames last 50ms each, so 60ms lands in the second
    let index = extract::still(&fetcher(), &source, Duration::from_millis(60), &output_str, &limits)
        .await
        .unwrap();
    assert_eq!(index, 1);
    assert_eq!(png_size(&output), (2, 2));

    let index = extract::still(&fetcher(), &source, Duration::from_secs(60), &output_str, &limits)
        .await
        .unwrap();
    assert_eq!(index, 2);
}

#[tokio::test]
async fn test_sheet_defaults() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 3);
    let output = dir.path().join("sheet.png");

    extract::sheet(
        &fetcher(),
        &source,
        &SheetOptions::default(),
        &output.to_string_lossy(),
        &DecodeLimits::default(),
    )
    .await
    .unwrap();

    // Two columns of 2px tiles with a 2px gap, two rows
    assert_eq!(png_size(&output), (6, 6));
}

#[tokio::test]
async fn test_sheet_rejects_zero_frames() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 3);
    let output = dir.path().join("sheet.png");
    let options = SheetOptions::builder().count(0).build();

    let err = extract::sheet(
        &fetcher(),
        &source,
        &options,
        &output.to_string_lossy(),
        &DecodeLimits::default(),
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("frame count must be positive"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_info_reports_frames() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 3);

    let info = extract::info(&fetcher(), &source, &DecodeLimits::default())
        .await
        .unwrap();
    assert_eq!(info.frame_count, 3);
    assert_eq!((info.width, info.height), (2, 2));
    assert_eq!(info.total_duration_ms, 150);
    assert!(info.animated);
    assert!(info.frames.iter().all(|frame| frame.delay_ms == 50));
}

#[tokio::test]
async fn test_info_respects_frame_limit() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 5);
    let limits = DecodeLimits::builder().max_frames(2).build();

    let info = extract::info(&fetcher(), &source, &limits).await.unwrap();
    assert_eq!(info.frame_count, 2);
}

#[tokio::test]
async fn test_missing_source_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.gif");

    let err = extract::info(&fetcher(), &missing.to_string_lossy(), &DecodeLimits::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Failed to fetch"));
}

#[tokio::test]
async fn test_garbage_input_fails_to_decode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noise.gif");
    std::fs::write(&path, b"not an image at all").unwrap();

    let err = extract::info(&fetcher(), &path.to_string_lossy(), &DecodeLimits::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Failed to decode"));
}

#[tokio::test]
async fn test_sheet_with_huge_layout_options() {
    let dir = TempDir::new().unwrap();
    let source = write_gif(&dir, 3);
    let output = dir.path().join("sheet.png");
    let output_str = output.to_string_lossy().to_string();
    let limits = DecodeLimits::default();

    // Columns beyond the frame count collapse to a single row
    let wide = SheetOptions::builder().columns(1_000_000).padding(0).build();
    extract::sheet(&fetcher(), &source, &wide, &output_str, &limits)
        .await
        .unwrap();
    assert_eq!(png_size(&output), (6, 2));

    let padded = SheetOptions::builder().columns(3).padding(i64::MAX).build();
    let err = extract::sheet(&fetcher(), &source, &padded, &output_str, &limits)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("contact sheet of"));
}
