// ABOUTME: Decode resource limits and frame delay policy
// ABOUTME: Normalizes "0 = default" and "-1 = unlimited" into concrete budgets

use crate::constants::{delays, limits};
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Budgets applied while decoding.
///
/// Numeric limits follow a small convention: `-1` (any negative value) disables the
/// limit, `0` selects the default. Delays left at zero select their defaults as well.
/// Call [`DecodeLimits::normalized`] to resolve both conventions; the decoder does this
/// itself, so callers can pass raw values through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct DecodeLimits {
    #[builder(default = limits::DEFAULT_MAX_FRAMES)]
    pub max_frames: i64,

    #[builder(default = limits::DEFAULT_MAX_PIXELS)]
    pub max_pixels: i64,

    #[builder(default = limits::DEFAULT_MAX_BYTES)]
    pub max_bytes: i64,

    #[builder(default = delays::DEFAULT_DELAY)]
    pub default_delay: Duration,

    #[builder(default = delays::MIN_DELAY)]
    pub min_delay: Duration,

    #[builder(default = delays::MAX_DELAY)]
    pub max_delay: Duration,

    /// Refuse to fall back to single-frame decoding for non-animated input
    #[builder(default = false)]
    pub strict_animated_only: bool,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits::builder().build()
    }
}

impl DecodeLimits {
    /// Replace zero values with defaults and repair an inverted delay range
    pub fn normalized(mut self) -> Self {
        if self.max_frames == 0 {
            self.max_frames = limits::DEFAULT_MAX_FRAMES;
        }
        if self.max_pixels == 0 {
            self.max_pixels = limits::DEFAULT_MAX_PIXELS;
        }
        if self.max_bytes == 0 {
            self.max_bytes = limits::DEFAULT_MAX_BYTES;
        }
        if self.default_delay.is_zero() {
            self.default_delay = delays::DEFAULT_DELAY;
        }
        if self.min_delay.is_zero() {
            self.min_delay = delays::MIN_DELAY;
        }
        if self.max_delay.is_zero() {
            self.max_delay = delays::MAX_DELAY;
        }
        if self.max_delay < self.min_delay {
            self.max_delay = self.min_delay;
        }
        self
    }

    pub fn frame_cap(&self) -> Option<usize> {
        bounded(self.max_frames).map(|cap| cap as usize)
    }

    pub fn pixel_budget(&self) -> Option<u64> {
        bounded(self.max_pixels)
    }

    pub fn byte_cap(&self) -> Option<u64> {
        bounded(self.max_bytes)
    }

    /// Delay for a frame whose source duration is `source` (`None` or zero when missing)
    pub fn resolve_delay(&self, source: Option<Duration>) -> Duration {
        let delay = source
            .filter(|d| !d.is_zero())
            .unwrap_or(self.default_delay);
        let max = self.max_delay.max(self.min_delay);
        delay.max(self.min_delay).min(max)
    }
}

fn bounded(limit: i64) -> Option<u64> {
    if limit < 0 { None } else { Some(limit as u64) }
}
