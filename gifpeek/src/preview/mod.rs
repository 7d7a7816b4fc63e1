// ABOUTME: Animated preview lifecycle: id allocation, load bookkeeping and frame playback
// ABOUTME: The driver is terminal-agnostic and writes protocol bytes to any io::Write

pub mod driver;
pub mod handle;

pub use driver::{Geometry, PreviewConfig, PreviewDriver, PreviewPhase};
pub use handle::{AnimationHandle, ImageId, ImageIdArena};
