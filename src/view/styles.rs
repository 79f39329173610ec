//! Row and cell styling, and the glyphs drawn in the title cell.

use crate::model::Selection;
use crate::render::{Expander, RowClasses};
use ratatui::style::{Color, Modifier, Style};

/// Style of the column header.
pub fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Gray)
        .add_modifier(Modifier::BOLD)
}

/// Style of the status bar.
pub fn status_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

/// Base style of a row from its state classes.
///
/// Error wins over loading, which wins over the active highlight.
pub fn row_style(classes: &RowClasses) -> Style {
    let mut style = Style::default();
    if classes.active {
        style = if classes.focused {
            style.bg(Color::Blue).fg(Color::White)
        } else {
            style.bg(Color::DarkGray)
        };
    }
    if classes.cell_mode {
        // The active cell carries the highlight instead of the whole row.
        style = Style::default().add_modifier(Modifier::UNDERLINED);
    }
    if classes.loading {
        style = style.fg(Color::Yellow).add_modifier(Modifier::ITALIC);
    }
    if classes.no_data {
        style = style.add_modifier(Modifier::DIM);
    }
    if classes.error {
        style = style.fg(Color::Red);
    }
    style
}

/// Style of the active cell in a cell mode.
pub fn active_cell_style(editing: bool) -> Style {
    if editing {
        Style::default().bg(Color::White).fg(Color::Black)
    } else {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}

/// Expand/collapse toggle.
pub fn expander_glyph(expander: Expander) -> &'static str {
    match expander {
        Expander::None => " ",
        Expander::Collapsed => "▸",
        Expander::Expanded => "▾",
        Expander::Loading => "⟳",
    }
}

/// Tri-state checkbox.
pub fn checkbox_glyph(selection: Selection) -> &'static str {
    match selection {
        Selection::Unchecked => "☐",
        Selection::Checked => "☑",
        Selection::Partial => "◩",
    }
}

/// Node icon by name. Unknown names are drawn as a bullet.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "folder" => "▢",
        "folder-open" => "▣",
        "doc" => "•",
        "section" => "§",
        _ => "◦",
    }
}
