// ABOUTME: Terminal graphics protocols, capability detection, frame cache and fetching
// ABOUTME: Encoders are stateless and write escape sequences straight to the output

use crate::constants::protocol::{MAX_DELAY, MIN_DELAY};
use std::time::Duration;

pub mod cache;
pub mod detection;
pub mod fetcher;
pub mod iterm2;
pub mod kitty;

pub use cache::{CacheEntry, FrameCache, PreviewSource};
pub use detection::{InlineProtocol, TerminalCapabilities};
pub use fetcher::{FetchError, Fetcher, ImageFetcher};

/// Whole milliseconds for the wire, clamped so a protocol never sees zero or an
/// unbounded delay
pub fn protocol_delay_ms(delay: Duration) -> u32 {
    delay.clamp(MIN_DELAY, MAX_DELAY).as_millis() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_delay_clamps() {
        assert_eq!(protocol_delay_ms(Duration::ZERO), 10);
        assert_eq!(protocol_delay_ms(Duration::from_micros(9_999)), 10);
        assert_eq!(protocol_delay_ms(Duration::from_millis(80)), 80);
        assert_eq!(protocol_delay_ms(Duration::from_millis(1500)), 1000);
        assert_eq!(protocol_delay_ms(Duration::from_micros(15_700)), 15);
    }
}
