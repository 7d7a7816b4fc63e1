// ABOUTME: This module handles output formatting for the info command
// ABOUTME: It provides table formatting with color support and JSON output

use anyhow::Result;
use gifpeek_decode::FrameSet;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameInfo {
    pub index: usize,
    pub delay_ms: u64,
    pub png_bytes: usize,
}

/// Summary of a decoded source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub total_duration_ms: u64,
    pub animated: bool,
    pub frames: Vec<FrameInfo>,
}

impl ImageInfo {
    pub fn from_frames(source: impl Into<String>, set: &FrameSet) -> Self {
        let frames = set
            .frames()
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameInfo {
                index,
                delay_ms: frame.delay.as_millis() as u64,
                png_bytes: frame.png.len(),
            })
            .collect();

        Self {
            source: source.into(),
            width: set.width(),
            height: set.height(),
            frame_count: set.len(),
            total_duration_ms: set.total_duration().as_millis() as u64,
            animated: set.is_animated(),
            frames,
        }
    }
}

pub trait OutputFormat {
    fn format_info(&self, info: &ImageInfo) -> Result<String>;
}

pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn summary(&self, info: &ImageInfo) -> String {
        let kind = if info.animated { "animated" } else { "still" };
        let frames = match info.frame_count {
            1 => "1 frame".to_string(),
            n => format!("{n} frames"),
        };
        let source = if self.use_color {
            info.source.bold().to_string()
        } else {
            info.source.clone()
        };
        let details = format!(
            "{}x{}, {frames}, {}ms total ({kind})",
            info.width, info.height, info.total_duration_ms
        );
        if self.use_color {
            format!("{source}\n{}", details.dimmed())
        } else {
            format!("{source}\n{details}")
        }
    }
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Frame")]
    frame: usize,
    #[tabled(rename = "Delay")]
    delay: String,
    #[tabled(rename = "PNG bytes")]
    size: usize,
}

impl OutputFormat for TableFormatter {
    fn format_info(&self, info: &ImageInfo) -> Result<String> {
        let rows: Vec<TableRow> = info
            .frames
            .iter()
            .map(|frame| TableRow {
                frame: frame.index,
                delay: format!("{}ms", frame.delay_ms),
                size: frame.png_bytes,
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        Ok(format!("{}\n\n{table}", self.summary(info)))
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormat for JsonFormatter {
    fn format_info(&self, info: &ImageInfo) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(info)?)
        } else {
            Ok(serde_json::to_string(info)?)
        }
    }
}
