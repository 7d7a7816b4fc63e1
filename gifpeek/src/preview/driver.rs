// ABOUTME: Preview state machine owning the displayed animation and its terminal image
// ABOUTME: Chooses native or software playback and resends only on actual changes

use super::handle::{AnimationHandle, ImageId, ImageIdArena};
use crate::constants::ui;
use crate::image_protocols::iterm2::{self, InlineFile};
use crate::image_protocols::{InlineProtocol, PreviewSource, kitty};
use crossterm::{cursor::MoveTo, queue};
use log::{debug, trace};
use std::io::{self, Write};
use std::time::Instant;

/// Resolved preview settings, fixed for the lifetime of a driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewConfig {
    pub protocol: InlineProtocol,
    /// Advance frames from the client instead of relying on terminal playback
    pub software_animation: bool,
    /// Cell width divided by cell height
    pub cell_aspect: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            protocol: InlineProtocol::None,
            software_animation: false,
            cell_aspect: ui::DEFAULT_CELL_ASPECT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    /// Nothing selected, or the selection has no usable image
    Empty,
    /// Fetch or decode in flight
    Loading,
    /// The terminal loops the animation
    ReadyNative,
    /// The driver advances frames on render ticks
    ReadySoftware,
}

/// Preview rectangle in 0-based terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub row: u16,
    pub col: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    fn grew_from(&self, previous: &Geometry) -> bool {
        self.cols > previous.cols || self.rows > previous.rows
    }
}

#[derive(Debug, Default)]
struct SoftwareClock {
    active: bool,
    frame: usize,
    next: Option<Instant>,
}

pub struct PreviewDriver {
    config: PreviewConfig,
    ids: ImageIdArena,
    phase: PreviewPhase,
    pending: Option<ImageId>,
    current: Option<AnimationHandle>,
    needs_send: bool,
    dirty: bool,
    last_geometry: Option<Geometry>,
    software: SoftwareClock,
}

impl PreviewDriver {
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            config,
            ids: ImageIdArena::new(),
            phase: PreviewPhase::Empty,
            pending: None,
            current: None,
            needs_send: false,
            dirty: false,
            last_geometry: None,
            software: SoftwareClock::default(),
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&AnimationHandle> {
        self.current.as_ref()
    }

    /// Id of the selection whose load is in flight
    pub fn pending(&self) -> Option<ImageId> {
        self.pending
    }

    pub fn live_id(&self) -> Option<ImageId> {
        self.ids.live()
    }

    pub fn last_geometry(&self) -> Option<Geometry> {
        self.last_geometry
    }

    /// Index of the frame on screen in software playback
    pub fn software_frame(&self) -> usize {
        self.software.frame
    }

    /// Whether sources must be decoded into frames before they can be shown
    pub fn needs_frames(&self) -> bool {
        self.config.protocol == InlineProtocol::Kitty
    }

    /// Pixel size of the current image, when known
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.current
            .as_ref()
            .map(|handle| (handle.source.width, handle.source.height))
            .filter(|(w, h)| *w > 0 && *h > 0)
    }

    /// Whether the next `draw` would write anything
    pub fn needs_draw(&self) -> bool {
        match self.current {
            Some(_) => self.needs_send || self.dirty,
            None => self.ids.live().is_some() || self.last_geometry.is_some(),
        }
    }

    /// Start a new activation: drop the previous image and allocate a fresh id
    pub fn select<W: Write>(&mut self, out: &mut W) -> io::Result<ImageId> {
        self.delete_live(out)?;
        let id = self.ids.allocate();
        debug!("preview: selecting image {id}");

        self.pending = Some(id);
        self.current = None;
        self.phase = PreviewPhase::Loading;
        self.needs_send = true;
        self.dirty = true;
        self.software = SoftwareClock::default();
        Ok(id)
    }

    /// Attach a loaded source to activation `id`. Returns false, leaving the state
    /// untouched, when `id` is no longer the pending activation.
    pub fn load_complete(&mut self, id: ImageId, source: PreviewSource) -> bool {
        if self.pending != Some(id) {
            debug!("preview: discarding stale load for image {id}");
            return false;
        }
        self.pending = None;
        self.phase = if self.config.protocol == InlineProtocol::Kitty && !self.config.software_animation {
            PreviewPhase::ReadyNative
        } else {
            PreviewPhase::ReadySoftware
        };
        debug!("preview: image {id} ready ({:?})", self.phase);
        self.current = Some(AnimationHandle { id, source });
        self.needs_send = true;
        self.dirty = true;
        true
    }

    /// Drop activation `id` after a failed fetch or decode
    pub fn load_failed(&mut self, id: ImageId) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        debug!("preview: load failed for image {id}");
        self.reset();
        true
    }

    /// Remove the preview entirely, e.g. when nothing is selected
    pub fn clear<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.delete_live(out)?;
        self.reset();
        Ok(())
    }

    /// Force a resend on the next draw, e.g. after the screen was wiped
    pub fn invalidate(&mut self) {
        if self.current.is_some() {
            self.needs_send = true;
            self.dirty = true;
        }
    }

    /// Bring the terminal in line with the current state. Writes nothing unless the
    /// activation or `geometry` changed since the last send.
    pub fn draw<W: Write>(&mut self, out: &mut W, geometry: Geometry, now: Instant) -> io::Result<()> {
        let Some(handle) = self.current.clone() else {
            self.delete_live(out)?;
            if let Some(last) = self.last_geometry.take() {
                if self.config.protocol == InlineProtocol::Iterm {
                    erase_rect(out, &last)?;
                }
            }
            return Ok(());
        };
        if geometry.is_empty() {
            return Ok(());
        }
        if self.last_geometry != Some(geometry) {
            self.dirty = true;
        }
        if !self.needs_send && !self.dirty {
            return Ok(());
        }

        match (self.config.protocol, self.phase) {
            (InlineProtocol::Kitty, PreviewPhase::ReadyNative) => self.draw_native(out, &handle, geometry)?,
            (InlineProtocol::Kitty, _) => self.draw_software(out, &handle, geometry, now)?,
            (InlineProtocol::Iterm, _) => self.draw_inline(out, &handle, geometry)?,
            (InlineProtocol::None, _) => {}
        }

        self.last_geometry = Some(geometry);
        self.needs_send = false;
        self.dirty = false;
        Ok(())
    }

    /// Advance software playback when its deadline has passed. Returns whether a frame
    /// was sent.
    pub fn tick<W: Write>(&mut self, out: &mut W, now: Instant) -> io::Result<bool> {
        if self.phase != PreviewPhase::ReadySoftware || !self.software.active {
            return Ok(false);
        }
        // Geometry is stale until the pending resend happens
        if self.needs_send || self.dirty {
            return Ok(false);
        }
        let Some(handle) = self.current.as_ref() else {
            return Ok(false);
        };
        let Some(frames) = handle.source.frames.as_deref() else {
            return Ok(false);
        };
        if frames.len() < 2 {
            return Ok(false);
        }
        let Some(geometry) = self.last_geometry.filter(|g| !g.is_empty()) else {
            return Ok(false);
        };
        match self.software.next {
            Some(next) if now >= next => {}
            _ => return Ok(false),
        }

        let index = (self.software.frame + 1) % frames.len();
        let Some(frame) = frames.get(index) else {
            return Ok(false);
        };
        trace!("preview: image {} advancing to frame {index}", handle.id);
        move_to(out, &geometry)?;
        kitty::send_frame(out, handle.id.get(), frame, geometry.cols, geometry.rows)?;

        self.software.frame = index;
        self.software.next = Some(now + frame.delay);
        Ok(true)
    }

    /// Delete any live terminal image before exit
    pub fn shutdown<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.delete_live(out)?;
        self.reset();
        self.last_geometry = None;
        Ok(())
    }

    fn reset(&mut self) {
        self.pending = None;
        self.current = None;
        self.phase = PreviewPhase::Empty;
        self.needs_send = false;
        self.dirty = true;
        self.software = SoftwareClock::default();
    }

    fn delete_live<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.config.protocol != InlineProtocol::Kitty {
            return Ok(());
        }
        if let Some(old) = self.ids.release() {
            debug!("preview: deleting image {old}");
            kitty::delete(out, old.get())?;
        }
        Ok(())
    }

    fn draw_native<W: Write>(&mut self, out: &mut W, handle: &AnimationHandle, geometry: Geometry) -> io::Result<()> {
        let Some(frames) = handle.source.frames.as_deref() else {
            return Ok(());
        };
        move_to(out, &geometry)?;

        if !self.needs_send && self.ids.live() == Some(handle.id) {
            // Same image, new size or position
            return kitty::place(out, handle.id.get(), geometry.cols, geometry.rows);
        }

        self.delete_live(out)?;
        move_to(out, &geometry)?;
        kitty::send_animation(out, handle.id.get(), frames.frames(), geometry.cols, geometry.rows)?;
        self.ids.mark_live(handle.id);
        Ok(())
    }

    fn draw_software<W: Write>(
        &mut self,
        out: &mut W,
        handle: &AnimationHandle,
        geometry: Geometry,
        now: Instant,
    ) -> io::Result<()> {
        let Some(frames) = handle.source.frames.as_deref() else {
            return Ok(());
        };
        let index = if self.needs_send {
            0
        } else {
            self.software.frame.min(frames.len() - 1)
        };
        let frame = &frames.frames()[index];

        self.delete_live(out)?;
        move_to(out, &geometry)?;
        kitty::send_frame(out, handle.id.get(), frame, geometry.cols, geometry.rows)?;
        self.ids.mark_live(handle.id);

        self.software = SoftwareClock {
            active: true,
            frame: index,
            next: Some(now + frame.delay),
        };
        Ok(())
    }

    fn draw_inline<W: Write>(&mut self, out: &mut W, handle: &AnimationHandle, geometry: Geometry) -> io::Result<()> {
        // Inline files have no alpha-aware redraw, so wipe what may show through
        let previous = self.last_geometry;
        if let Some(previous) = &previous {
            erase_rect(out, previous)?;
        }
        if previous.is_none_or(|previous| geometry.grew_from(&previous)) {
            erase_rect(out, &geometry)?;
        }

        move_to(out, &geometry)?;
        iterm2::send_inline_file(
            out,
            &InlineFile {
                name: &handle.source.name,
                data: &handle.source.raw,
                width_cells: geometry.cols,
                height_cells: geometry.rows,
            },
        )
    }
}

fn move_to<W: Write>(out: &mut W, geometry: &Geometry) -> io::Result<()> {
    queue!(out, MoveTo(geometry.col, geometry.row))
}

/// Blank a rectangle with ECH so surrounding cells are left alone
pub fn erase_rect<W: Write>(out: &mut W, geometry: &Geometry) -> io::Result<()> {
    if geometry.is_empty() {
        return Ok(());
    }
    for offset in 0..geometry.rows {
        queue!(out, MoveTo(geometry.col, geometry.row.saturating_add(offset)))?;
        write!(out, "\x1b[{}X", geometry.cols)?;
    }
    Ok(())
}
