// ABOUTME: Terminal-side image handles: monotonically allocated ids, one live at a time
// ABOUTME: An AnimationHandle binds one activation's id to the source it shows

use crate::image_protocols::PreviewSource;
use std::fmt;

/// Protocol-level image id. Zero is never allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u32);

impl ImageId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates ids and tracks the single id that currently owns terminal-side image data
#[derive(Debug)]
pub struct ImageIdArena {
    next: u32,
    live: Option<ImageId>,
}

impl Default for ImageIdArena {
    fn default() -> Self {
        Self { next: 1, live: None }
    }
}

impl ImageIdArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ImageId {
        let id = ImageId(self.next);
        // Skip zero on wrap; it means "no image" on the wire
        self.next = self.next.checked_add(1).unwrap_or(1);
        id
    }

    pub fn live(&self) -> Option<ImageId> {
        self.live
    }

    /// Record `id` as the live image, returning the one it replaces
    pub fn mark_live(&mut self, id: ImageId) -> Option<ImageId> {
        self.live.replace(id).filter(|old| *old != id)
    }

    /// Forget the live image, returning it so the caller can delete it
    pub fn release(&mut self) -> Option<ImageId> {
        self.live.take()
    }
}

#[derive(Debug, Clone)]
pub struct AnimationHandle {
    pub id: ImageId,
    pub source: PreviewSource,
}

impl AnimationHandle {
    pub fn frame_count(&self) -> usize {
        self.source.frames.as_ref().map_or(0, |set| set.len())
    }
}
