//! The tree grid and its status bar as ratatui widgets.
//!
//! Only the materialized rows of the viewport are drawn. Everything shown
//! comes from the row elements produced by the last flush, never from the
//! tree directly, so the screen reflects exactly what has been rendered.

use super::constants::HEADER_HEIGHT;
use super::styles::{
    active_cell_style, checkbox_glyph, expander_glyph, header_style, icon_glyph, row_style,
    status_style,
};
use crate::grid::TreeGrid;
use crate::layout::TitleMetrics;
use crate::render::RowElement;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Caret appended to text being edited.
const EDIT_CARET: char = '▏';

/// Header plus visible rows of a [`TreeGrid`].
pub struct GridView<'a> {
    grid: &'a TreeGrid,
}

impl<'a> GridView<'a> {
    /// Draw `grid`.
    pub fn new(grid: &'a TreeGrid) -> Self {
        Self { grid }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, header_style());
        for cell in self.grid.viewport().header().cells() {
            let Some((x, width)) = clip(area, cell.left, cell.width) else {
                continue;
            };
            let mut style = header_style();
            if cell.active {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let text = fit(&format!(" {}", cell.title), usize::from(width));
            buf.set_stringn(x, area.y, text, usize::from(width), style);
        }
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        let viewport = self.grid.viewport();
        let scroll_top = viewport.scroll_top();
        for row in viewport.rows() {
            // Prefetched rows above or below the window are not drawn.
            let Some(offset) = row.top().checked_sub(scroll_top) else {
                continue;
            };
            if offset >= u32::from(area.height) {
                continue;
            }
            let line = Rect {
                y: area.y + offset as u16,
                height: 1,
                ..area
            };
            let style = row_style(row.classes());
            buf.set_style(line, style);
            self.render_title(row, line, buf, style);
            for cell in row.cells().iter().filter(|c| c.column > 0) {
                let Some((x, width)) = clip(line, cell.left, cell.width) else {
                    continue;
                };
                let cell_style = if cell.active {
                    active_cell_style(cell.editing)
                } else {
                    style
                };
                let text = if cell.editing {
                    self.edit_text()
                } else {
                    cell.text.clone()
                };
                // Keep one column free as a separator.
                let room = usize::from(width.saturating_sub(1));
                buf.set_style(Rect { x, width, ..line }, cell_style);
                buf.set_stringn(x, line.y, fit(&text, room), room, cell_style);
            }
        }
    }

    fn render_title(&self, row: &RowElement, line: Rect, buf: &mut Buffer, style: Style) {
        let (left, width) = if row.is_colspan() {
            (0, u32::from(line.width))
        } else {
            self.grid
                .geometry()
                .get(0)
                .map_or((0, u32::from(line.width)), |c| (c.offset, c.width))
        };
        let Some((x0, width)) = clip(line, left, width) else {
            return;
        };
        let metrics: TitleMetrics = self.grid.options().title_metrics;
        let spans = metrics.spans(row.level(), row.checkbox().is_some(), true);
        let end = u32::from(x0) + u32::from(width);
        let mut put = |at: u32, text: &str, style: Style| {
            let x = u32::from(x0) + at;
            if x < end {
                let room = (end - x) as usize;
                buf.set_stringn(x as u16, line.y, text, room, style);
            }
        };

        put(spans.expander, expander_glyph(row.expander()), style);
        if let (Some(at), Some(selection)) = (spans.checkbox, row.checkbox()) {
            put(at, checkbox_glyph(selection), style);
        }
        if let Some(at) = spans.icon {
            put(at, icon_glyph(row.icon()), style);
        }

        let title_cell = row.cells().first();
        let editing = title_cell.is_some_and(|c| c.editing)
            || (row.is_colspan()
                && self
                    .grid
                    .edit()
                    .is_some_and(|e| Some(e.node) == row.node() && e.column == 0));
        let active = title_cell.is_some_and(|c| c.active)
            || (row.is_colspan() && row.classes().cell_mode);
        let title_style = if active {
            active_cell_style(editing)
        } else {
            style
        };
        let mut title = if editing {
            self.edit_text()
        } else {
            row.title().to_string()
        };
        if let Some(error) = row.error() {
            title = format!("{title} ({error})");
        }
        let room = width.saturating_sub(1) as u32;
        let room = room.saturating_sub(spans.title) as usize;
        put(spans.title, &fit(&title, room), title_style);
    }

    fn edit_text(&self) -> String {
        self.grid
            .edit()
            .map(|e| format!("{}{EDIT_CARET}", e.value))
            .unwrap_or_default()
    }
}

impl Widget for GridView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let header = Rect {
            height: HEADER_HEIGHT.min(area.height),
            ..area
        };
        self.render_header(header, buf);
        let rows = Rect {
            y: area.y + header.height,
            height: area.height - header.height,
            ..area
        };
        self.render_rows(rows, buf);
    }
}

/// One-line summary of mode, active node and column.
pub struct StatusBar<'a> {
    grid: &'a TreeGrid,
    pending_loads: usize,
}

impl<'a> StatusBar<'a> {
    /// Status of `grid` with `pending_loads` lazy loads in flight.
    pub fn new(grid: &'a TreeGrid, pending_loads: usize) -> Self {
        Self {
            grid,
            pending_loads,
        }
    }

    /// The status text.
    pub fn text(&self) -> String {
        let grid = self.grid;
        let active = grid
            .active_node()
            .and_then(|id| grid.tree().get(id))
            .map_or_else(|| "-".to_string(), |n| n.title().to_string());
        let column = grid
            .columns()
            .get(grid.active_column())
            .map_or("", |c| c.title.as_str());
        let mut text = format!(
            " {} │ {} │ col {}/{} {} │ {} rows",
            grid.mode().to_string().to_uppercase(),
            active,
            grid.active_column() + 1,
            grid.column_count(),
            column,
            grid.visible_nodes().len(),
        );
        if self.pending_loads > 0 {
            text.push_str(&format!(" │ loading {}", self.pending_loads));
        }
        text
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        buf.set_style(area, status_style());
        let text = self.text();
        buf.set_stringn(
            area.x,
            area.y,
            fit(&text, usize::from(area.width)),
            usize::from(area.width),
            status_style(),
        );
    }
}

/// Clip a column span to `area`. Returns the screen x and width.
fn clip(area: Rect, left: u32, width: u32) -> Option<(u16, u16)> {
    let area_width = u32::from(area.width);
    if left >= area_width || width == 0 {
        return None;
    }
    let width = width.min(area_width - left);
    Some((area.x + left as u16, width as u16))
}

/// Truncate `text` to `width` display columns, marking the cut with `…`.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
