// ABOUTME: Centralized constants for the frame decoder
// ABOUTME: Contains default resource limits and frame delay bounds

/// Resource limit defaults, applied when a limit is left at `0`
pub mod limits {
    /// Marker for "no limit" on any numeric limit
    pub const UNLIMITED: i64 = -1;

    /// Maximum number of frames kept from an animation
    pub const DEFAULT_MAX_FRAMES: i64 = 60;

    /// Maximum canvas width * height * frame count
    pub const DEFAULT_MAX_PIXELS: i64 = 40_000_000;

    /// Maximum input size in bytes (20 MiB)
    pub const DEFAULT_MAX_BYTES: i64 = 20 << 20;

    /// Largest contact sheet, width * height
    pub const MAX_SHEET_PIXELS: u64 = 40_000_000;
}

/// Frame delay defaults
pub mod delays {
    use std::time::Duration;

    /// Used when the source frame has no delay or a zero delay
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(80);

    /// Lower clamp bound for every produced frame
    pub const MIN_DELAY: Duration = Duration::from_millis(10);

    /// Upper clamp bound for every produced frame
    pub const MAX_DELAY: Duration = Duration::from_secs(1);

    /// GIF delays are expressed in hundredths of a second
    pub const GIF_DELAY_UNIT: Duration = Duration::from_millis(10);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_limit_constants() {
        assert_eq!(limits::UNLIMITED, -1);
        assert_eq!(limits::DEFAULT_MAX_FRAMES, 60);
        assert_eq!(limits::DEFAULT_MAX_PIXELS, 40_000_000);
        assert_eq!(limits::DEFAULT_MAX_BYTES, 20 * 1024 * 1024);
    }

    #[test]
    fn test_delay_constants() {
        assert_eq!(delays::DEFAULT_DELAY, Duration::from_millis(80));
        assert!(delays::MIN_DELAY < delays::DEFAULT_DELAY);
        assert!(delays::DEFAULT_DELAY < delays::MAX_DELAY);
        assert_eq!(delays::GIF_DELAY_UNIT * 5, Duration::from_millis(50));
    }
}
