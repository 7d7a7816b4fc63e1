// ABOUTME: Screen composition for the browser: header, list, preview panel, status and hints
// ABOUTME: Text is redrawn in place; the preview driver decides whether image bytes go out

use super::state::AppState;
use crate::constants::ui;
use crate::image_protocols::InlineProtocol;
use crate::preview::{Geometry, PreviewDriver, PreviewPhase};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use std::io::{self, Write};
use std::time::Instant;

const HINTS: &str = " j/k move  g/G first/last  r reload  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPlacement {
    Side,
    Bottom,
    Hidden,
}

/// Screen regions for one terminal size, in 0-based cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub placement: PreviewPlacement,
    pub list: Geometry,
    /// Row and column of the preview label
    pub label: Option<(u16, u16)>,
    /// Area available to the image
    pub panel: Option<Geometry>,
    pub status_row: u16,
    pub hint_row: u16,
}

pub fn layout(cols: u16, rows: u16) -> Layout {
    let body_top = 1;
    let body_rows = rows.saturating_sub(3);
    let list = Geometry {
        row: body_top,
        col: 0,
        cols,
        rows: body_rows,
    };
    let base = Layout {
        width: cols,
        placement: PreviewPlacement::Hidden,
        list,
        label: None,
        panel: None,
        status_row: rows.saturating_sub(2),
        hint_row: rows.saturating_sub(1),
    };

    if cols >= ui::SIDE_PREVIEW_MIN_COLS && body_rows >= 2 {
        let list_cols = (u32::from(cols) * u32::from(ui::LIST_WIDTH_PERCENT) / 100) as u16;
        let preview_col = list_cols + 1;
        return Layout {
            placement: PreviewPlacement::Side,
            list: Geometry { cols: list_cols, ..list },
            label: Some((body_top, preview_col)),
            panel: Some(Geometry {
                row: body_top + 1,
                col: preview_col,
                cols: cols - preview_col,
                rows: body_rows - 1,
            }),
            ..base
        };
    }

    if rows >= ui::BOTTOM_PREVIEW_MIN_ROWS {
        let list_rows = body_rows / 2;
        let label_row = body_top + list_rows;
        return Layout {
            placement: PreviewPlacement::Bottom,
            list: Geometry { rows: list_rows, ..list },
            label: Some((label_row, 0)),
            panel: Some(Geometry {
                row: label_row + 1,
                col: 0,
                cols,
                rows: body_rows - list_rows - 1,
            }),
            ..base
        };
    }

    base
}

/// Largest rectangle inside `panel` matching the image aspect, anchored top-left
pub fn fit_preview(panel: Geometry, dimensions: Option<(u32, u32)>, cell_aspect: f64) -> Geometry {
    let Some((width, height)) = dimensions.filter(|(w, h)| *w > 0 && *h > 0) else {
        return panel;
    };
    if panel.is_empty() || cell_aspect <= 0.0 {
        return panel;
    }
    let (width, height) = (f64::from(width), f64::from(height));

    let mut cols = f64::from(panel.cols);
    let mut rows = (cols * cell_aspect * height / width).round();
    if rows > f64::from(panel.rows) {
        rows = f64::from(panel.rows);
        cols = (rows * width / (height * cell_aspect)).round();
    }

    Geometry {
        cols: (cols as u16).clamp(1, panel.cols),
        rows: (rows as u16).clamp(1, panel.rows),
        ..panel
    }
}

/// Draw one frame of the browser UI, then let the driver sync the preview
pub fn draw<W: Write>(
    out: &mut W,
    state: &mut AppState,
    driver: &mut PreviewDriver,
    size: (u16, u16),
    now: Instant,
) -> io::Result<()> {
    let (cols, rows) = size;
    if cols == 0 || rows < 3 {
        return Ok(());
    }
    let layout = layout(cols, rows);

    draw_text(out, state, driver, &layout)?;
    state.mark_clean();

    if let Some(panel) = layout.panel {
        if driver.config().protocol != InlineProtocol::None {
            let geometry = fit_preview(panel, driver.dimensions(), driver.config().cell_aspect);
            driver.draw(out, geometry, now)?;
        }
    }
    Ok(())
}

fn draw_text<W: Write>(out: &mut W, state: &mut AppState, driver: &PreviewDriver, layout: &Layout) -> io::Result<()> {
    let width = usize::from(layout.width);

    let header = match state.selected_index() {
        Some(index) => format!(" gifpeek  {}/{}", index + 1, state.items().len()),
        None => " gifpeek  no items".to_string(),
    };
    queue!(
        out,
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(fit(&header, width)),
        SetAttribute(Attribute::Reset)
    )?;

    // Pad instead of clearing to end of line so cells beside the list keep their image
    let list = layout.list;
    let list_width = usize::from(list.cols);
    state.ensure_visible(usize::from(list.rows));
    let selected = state.selected_index();
    for offset in 0..list.rows {
        let index = state.scroll() + usize::from(offset);
        queue!(out, MoveTo(list.col, list.row + offset))?;
        match state.items().get(index) {
            Some(item) if Some(index) == selected => queue!(
                out,
                SetAttribute(Attribute::Reverse),
                Print(fit(&format!("> {}", item.label), list_width)),
                SetAttribute(Attribute::Reset)
            )?,
            Some(item) => queue!(out, Print(fit(&format!("  {}", item.label), list_width)))?,
            None => queue!(out, Print(fit("", list_width)))?,
        }
    }

    if let Some((row, col)) = layout.label {
        let label = match driver.config().protocol {
            InlineProtocol::None => format!("{} (inline images unavailable)", ui::PREVIEW_LABEL),
            _ => ui::PREVIEW_LABEL.to_string(),
        };
        let label_width = usize::from(layout.width.saturating_sub(col));
        queue!(
            out,
            MoveTo(col, row),
            SetAttribute(Attribute::Underlined),
            Print(fit(&label, label_width)),
            SetAttribute(Attribute::Reset)
        )?;
    }

    queue!(
        out,
        MoveTo(0, layout.status_row),
        Print(fit(&status_line(state, driver), width)),
        MoveTo(0, layout.hint_row),
        SetAttribute(Attribute::Dim),
        Print(fit(HINTS, width)),
        SetAttribute(Attribute::Reset)
    )
}

fn status_line(state: &AppState, driver: &PreviewDriver) -> String {
    if let Some(status) = state.status() {
        return format!(" {status}");
    }
    match (driver.phase(), driver.current()) {
        (PreviewPhase::Loading, _) => " Loading...".to_string(),
        (PreviewPhase::ReadyNative | PreviewPhase::ReadySoftware, Some(handle)) => {
            let mut line = format!(" {}", handle.source.name);
            if let Some((w, h)) = driver.dimensions() {
                line.push_str(&format!("  {w}x{h}"));
            }
            match handle.frame_count() {
                0 => {}
                1 => line.push_str("  1 frame"),
                n => line.push_str(&format!("  {n} frames")),
            }
            line
        }
        _ => String::new(),
    }
}

fn fit(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat_n(' ', width - len));
    line
}
