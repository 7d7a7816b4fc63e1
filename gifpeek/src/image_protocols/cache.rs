// ABOUTME: Session-lifetime cache of fetched image bytes and their decoded frames
// ABOUTME: Frames are decoded lazily, once per source, and back-filled into the entry

use crate::image_protocols::iterm2::extract_filename_from_url;
use gifpeek_decode::{DecodeError, DecodeLimits, FrameSet, probe_dimensions};
use std::collections::HashMap;
use std::sync::Arc;

/// Raw bytes of one source and, once needed, its decoded frames
#[derive(Debug, Clone)]
pub struct CacheEntry {
    raw: Arc<[u8]>,
    frames: Option<Arc<FrameSet>>,
    width: u32,
    height: u32,
}

impl CacheEntry {
    fn new(raw: Arc<[u8]>, frames: Option<Arc<FrameSet>>) -> Self {
        let (width, height) = match &frames {
            Some(set) => (set.width(), set.height()),
            None => probe_dimensions(&raw).unwrap_or((0, 0)),
        };
        Self {
            raw,
            frames,
            width,
            height,
        }
    }

    pub fn raw(&self) -> &Arc<[u8]> {
        &self.raw
    }

    pub fn frames(&self) -> Option<&Arc<FrameSet>> {
        self.frames.as_ref()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Everything the preview needs to show one source. Shares data with the cache.
#[derive(Debug, Clone)]
pub struct PreviewSource {
    pub name: String,
    pub raw: Arc<[u8]>,
    pub frames: Option<Arc<FrameSet>>,
    pub width: u32,
    pub height: u32,
}

/// Keyed by the exact source string. Nothing is evicted; the cache lives as long as
/// the browsing session.
#[derive(Debug, Default)]
pub struct FrameCache {
    entries: HashMap<String, CacheEntry>,
    decodes: usize,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn put(&mut self, key: impl Into<String>, raw: impl Into<Arc<[u8]>>, frames: Option<FrameSet>) {
        let entry = CacheEntry::new(raw.into(), frames.map(Arc::new));
        self.entries.insert(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of decodes performed, for diagnostics
    pub fn decode_count(&self) -> usize {
        self.decodes
    }

    /// Build a preview for a cached source, decoding frames first when
    /// `needs_frames` is set and the entry has none yet. `None` means the source has
    /// not been fetched. A failed decode leaves the raw bytes cached.
    pub fn preview_source(
        &mut self,
        key: &str,
        needs_frames: bool,
        limits: &DecodeLimits,
    ) -> Result<Option<PreviewSource>, DecodeError> {
        let Some(entry) = self.entries.get_mut(key) else {
            return Ok(None);
        };

        if needs_frames && entry.frames.is_none() {
            self.decodes += 1;
            let set = gifpeek_decode::decode(&entry.raw, limits)?;
            log::debug!(
                "decoded {key}: {} frame(s), {}x{}",
                set.len(),
                set.width(),
                set.height()
            );
            entry.width = set.width();
            entry.height = set.height();
            entry.frames = Some(Arc::new(set));
        }

        Ok(Some(PreviewSource {
            name: extract_filename_from_url(key),
            raw: Arc::clone(&entry.raw),
            frames: entry.frames.clone(),
            width: entry.width,
            height: entry.height,
        }))
    }
}
