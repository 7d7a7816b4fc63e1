// ABOUTME: CLI argument definitions for the gifpeek application
// ABOUTME: Defines the command-line interface structure using clap derive macros

use crate::completions::{self, Shell};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gifpeek")]
#[command(about = "Preview animated images in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Read configuration from this file only
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Force colored output even when piped
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub force_color: bool,

    /// Enable verbose output for debugging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Write logs to this file (the only log output while browsing)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse a list of images with an animated preview
    Browse {
        /// Image URLs or paths
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<String>,
    },
    /// Write the frame shown at a timestamp as PNG
    Still {
        /// Image URL or path
        source: String,

        /// Timestamp such as 1.5s, 250ms or 1.5 (seconds)
        #[arg(long, default_value = "0", value_parser = parse_timestamp, allow_negative_numbers = true)]
        at: Duration,

        /// Output path, or - for stdout
        #[arg(short, long, default_value = "still.png")]
        output: String,
    },
    /// Write a contact sheet of evenly sampled frames as PNG
    Sheet {
        /// Image URL or path
        source: String,

        /// Number of frames to sample
        #[arg(long, default_value_t = 12, allow_negative_numbers = true)]
        frames: i64,

        /// Columns in the grid (0 picks a square-ish grid)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        cols: i64,

        /// Padding between tiles in pixels
        #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
        padding: i64,

        /// Output path, or - for stdout
        #[arg(short, long, default_value = "sheet.png")]
        output: String,
    },
    /// Show frame count, canvas size and delays
    Info {
        /// Image URL or path
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
    /// Generate shell completions
    #[command(after_help = completions::installation_instructions())]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse "1.5s", "250ms" or a bare number of seconds; negative values clamp to zero
pub fn parse_timestamp(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let (number, divisor) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1000.0)
    } else if let Some(secs) = value.strip_suffix('s') {
        (secs, 1.0)
    } else {
        (value, 1.0)
    };

    let seconds: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid timestamp '{value}', expected e.g. 1.5s or 250ms"))?;
    if !seconds.is_finite() {
        return Err(format!("invalid timestamp '{value}'"));
    }
    Ok(Duration::from_secs_f64((seconds / divisor).max(0.0)))
}
