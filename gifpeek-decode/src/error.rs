// ABOUTME: Error types for frame extraction with user-facing messages
// ABOUTME: Separates resource-limit failures from underlying codec failures

use std::fmt;
use thiserror::Error;

/// Which resource budget a decode ran over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Bytes,
    Pixels,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Bytes => write!(f, "input size"),
            Limit::Pixels => write!(f, "pixel budget"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image exceeds {limit} (limit {max}, needed at least {actual})")]
    TooLarge { limit: Limit, max: u64, actual: u64 },

    #[error("image has no frames")]
    NoFrames,

    #[error("image has invalid size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("input is not an animated GIF")]
    NotAnimated,

    #[error("frame count must be positive")]
    InvalidCount,

    #[error("contact sheet of {width}x{height} exceeds {max} pixels")]
    SheetTooLarge { width: u64, height: u64, max: u64 },

    #[error("GIF decode failed: {0}")]
    Gif(#[from] gif::DecodingError),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub fn too_large(limit: Limit, max: u64, actual: u64) -> Self {
        DecodeError::TooLarge { limit, max, actual }
    }

    /// Resource-limit failures are final and must never be masked by a fallback decode
    pub fn is_resource_limit(&self) -> bool {
        matches!(self, DecodeError::TooLarge { .. })
    }

    /// Errors that describe the content itself rather than the codec that read it
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DecodeError::TooLarge { .. } | DecodeError::NoFrames | DecodeError::InvalidSize { .. }
        )
    }

    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            DecodeError::TooLarge { limit: Limit::Bytes, .. } => {
                Some("Raise [decode] max_bytes in the config, or use -1 for no limit")
            }
            DecodeError::TooLarge { limit: Limit::Pixels, .. } => Some(
                "Raise [decode] max_pixels or lower max_frames in the config, or use -1 for no limit",
            ),
            DecodeError::NotAnimated => Some("Disable strict_animated_only to accept still images"),
            DecodeError::SheetTooLarge { .. } => Some("Use fewer --cols, a smaller --padding or fewer --frames"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(DecodeError::NoFrames.to_string(), "image has no frames");
        assert_eq!(
            DecodeError::InvalidSize {
                width: 0,
                height: 3
            }
            .to_string(),
            "image has invalid size 0x3"
        );
        assert_eq!(
            DecodeError::too_large(Limit::Bytes, 10, 11).to_string(),
            "image exceeds input size (limit 10, needed at least 11)"
        );
    }

    #[test]
    fn test_classification() {
        assert!(DecodeError::too_large(Limit::Pixels, 1, 4).is_resource_limit());
        assert!(DecodeError::too_large(Limit::Pixels, 1, 4).is_structural());
        assert!(DecodeError::NoFrames.is_structural());
        assert!(!DecodeError::NoFrames.is_resource_limit());
        assert!(!DecodeError::NotAnimated.is_structural());
    }

    #[test]
    fn test_help_text() {
        assert!(
            DecodeError::too_large(Limit::Bytes, 1, 2)
                .help_text()
                .unwrap()
                .contains("max_bytes")
        );
        assert!(
            DecodeError::too_large(Limit::Pixels, 1, 2)
                .help_text()
                .unwrap()
                .contains("max_pixels")
        );
        assert_eq!(DecodeError::NoFrames.help_text(), None);
    }
}
