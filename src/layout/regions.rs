//! Horizontal layout of the title cell.
//!
//! The title cell is laid out as indentation, expander, optional checkbox,
//! optional icon and title text, left to right. Pointer hit testing and the
//! TUI renderer share this layout.

/// Part of a row under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRegion {
    /// Indentation left of the expander.
    Prefix,
    /// Expand/collapse toggle.
    Expander,
    /// Checkbox.
    Checkbox,
    /// Node icon.
    Icon,
    /// Title text.
    Title,
    /// A data cell outside the title column.
    Column,
}

/// Widths of the fixed parts of the title cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleMetrics {
    /// Indentation per tree level.
    pub indent_width: u32,
    /// Width of the expander slot.
    pub expander_width: u32,
    /// Width of the checkbox slot.
    pub checkbox_width: u32,
    /// Width of the icon slot.
    pub icon_width: u32,
}

impl Default for TitleMetrics {
    fn default() -> Self {
        Self {
            indent_width: 2,
            expander_width: 2,
            checkbox_width: 2,
            icon_width: 2,
        }
    }
}

/// Spans of the title cell parts for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleSpans {
    /// Start of the expander.
    pub expander: u32,
    /// Start of the checkbox, if shown.
    pub checkbox: Option<u32>,
    /// Start of the icon, if shown.
    pub icon: Option<u32>,
    /// Start of the title text.
    pub title: u32,
}

impl TitleMetrics {
    /// Lay out the title cell of a row at `level`.
    pub fn spans(&self, level: usize, checkbox: bool, icon: bool) -> TitleSpans {
        let expander = self.indent_width.saturating_mul(level as u32);
        let mut x = expander + self.expander_width;
        let checkbox = checkbox.then(|| {
            let start = x;
            x += self.checkbox_width;
            start
        });
        let icon = icon.then(|| {
            let start = x;
            x += self.icon_width;
            start
        });
        TitleSpans {
            expander,
            checkbox,
            icon,
            title: x,
        }
    }

    /// Region of the title cell under `x`, relative to the cell's left edge.
    pub fn region_at(&self, x: u32, level: usize, checkbox: bool, icon: bool) -> NodeRegion {
        let spans = self.spans(level, checkbox, icon);
        if x < spans.expander {
            NodeRegion::Prefix
        } else if x < spans.expander + self.expander_width {
            NodeRegion::Expander
        } else if spans
            .checkbox
            .is_some_and(|start| x >= start && x < start + self.checkbox_width)
        {
            NodeRegion::Checkbox
        } else if spans
            .icon
            .is_some_and(|start| x >= start && x < start + self.icon_width)
        {
            NodeRegion::Icon
        } else {
            NodeRegion::Title
        }
    }
}
