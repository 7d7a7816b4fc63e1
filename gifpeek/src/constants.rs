// ABOUTME: Centralized constants for the gifpeek application
// ABOUTME: Contains timeouts, protocol parameters, environment variable names and UI sizes

/// Timeout configurations for various operations
pub mod timeouts {
    use std::time::Duration;

    /// Default timeout for image fetches
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

    /// Render tick driving software animation and pending-work checks
    pub const RENDER_TICK: Duration = Duration::from_millis(20);

    /// Progress bar tick interval for smooth animation
    pub const PROGRESS_BAR_TICK_MS: u64 = 80;
}

/// HTTP client settings
pub mod http {
    pub const USER_AGENT: &str = concat!("gifpeek/", env!("CARGO_PKG_VERSION"));

    pub const MAX_REDIRECTS: usize = 5;
}

/// Terminal graphics protocol parameters
pub mod protocol {
    use std::time::Duration;

    /// Base64 characters per cell-bitmap control sequence
    pub const CHUNK_SIZE: usize = 4096;

    /// Placement id used for every preview image
    pub const PLACEMENT_ID: u32 = 1;

    /// Bounds applied to every delay before it reaches the wire
    pub const MIN_DELAY: Duration = Duration::from_millis(10);
    pub const MAX_DELAY: Duration = Duration::from_secs(1);

    /// Name sent with inline files when the source has none
    pub const DEFAULT_INLINE_NAME: &str = "gifpeek.bin";
}

/// Environment variables read once at startup
pub mod env {
    pub const INLINE: &str = "GIFPEEK_INLINE";
    pub const SOFTWARE_ANIM: &str = "GIFPEEK_SOFTWARE_ANIM";
    pub const CELL_ASPECT: &str = "GIFPEEK_CELL_ASPECT";
}

/// UI and layout constants
pub mod ui {
    /// Cell width divided by cell height
    pub const DEFAULT_CELL_ASPECT: f64 = 0.5;

    /// Terminal width at which the preview moves beside the list
    pub const SIDE_PREVIEW_MIN_COLS: u16 = 80;

    /// Terminal height at which the preview fits below the list
    pub const BOTTOM_PREVIEW_MIN_ROWS: u16 = 16;

    /// Share of the width given to the list when the preview is beside it
    pub const LIST_WIDTH_PERCENT: u16 = 45;

    pub const PREVIEW_LABEL: &str = "Preview";
}
