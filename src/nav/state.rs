//! Navigation modes, policies and the state they drive.

use crate::model::{InputKind, NodeId};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationMode {
    /// Whole rows are active.
    #[default]
    Row,
    /// A single cell is active.
    CellNav,
    /// The active cell hosts an input control.
    CellEdit,
}

impl NavigationMode {
    /// Whether a cell (rather than a row) is active.
    pub fn is_cell_mode(self) -> bool {
        !matches!(self, Self::Row)
    }
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Row => "row",
            Self::CellNav => "cell",
            Self::CellEdit => "edit",
        })
    }
}

/// Which modes the grid may use and which one it starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum NavigationPolicy {
    /// Row mode only.
    #[serde(rename = "row")]
    RowOnly,
    /// Cell modes only.
    #[serde(rename = "cell")]
    CellOnly,
    /// Start in row mode, allow cell navigation.
    #[default]
    #[serde(rename = "start-row")]
    StartRowAllowCell,
    /// Start in cell navigation, allow row mode.
    #[serde(rename = "start-cell")]
    StartCellAllowRow,
}

impl NavigationPolicy {
    /// Whether row mode may be entered.
    pub fn allows_row(self) -> bool {
        !matches!(self, Self::CellOnly)
    }

    /// Whether cell navigation may be entered.
    pub fn allows_cell(self) -> bool {
        !matches!(self, Self::RowOnly)
    }

    /// Mode the grid starts in.
    pub fn initial_mode(self) -> NavigationMode {
        match self {
            Self::RowOnly | Self::StartRowAllowCell => NavigationMode::Row,
            Self::CellOnly | Self::StartCellAllowRow => NavigationMode::CellNav,
        }
    }

    /// Mode to switch to if `mode` is not permitted.
    pub fn conform(self, mode: NavigationMode) -> NavigationMode {
        match mode {
            NavigationMode::Row if !self.allows_row() => NavigationMode::CellNav,
            NavigationMode::CellNav | NavigationMode::CellEdit if !self.allows_cell() => {
                NavigationMode::Row
            }
            other => other,
        }
    }
}

/// Error for unknown policy names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown navigation mode {0:?} (expected row, cell, start-row or start-cell)")]
pub struct ParsePolicyError(pub String);

impl FromStr for NavigationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "row" => Ok(Self::RowOnly),
            "cell" => Ok(Self::CellOnly),
            "start-row" => Ok(Self::StartRowAllowCell),
            "start-cell" => Ok(Self::StartCellAllowRow),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Mode, active node, active column and focus.
///
/// Starts in row mode with no active node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    /// Current mode.
    pub mode: NavigationMode,
    /// Active node, if any.
    pub active_node: Option<NodeId>,
    /// Active column, meaningful in cell modes.
    pub active_column: usize,
    /// Whether the grid owns input focus.
    pub focused: bool,
}

impl NavigationState {
    /// Whether `column` of `node` is the active cell.
    pub fn is_active_cell(&self, node: NodeId, column: usize) -> bool {
        self.mode.is_cell_mode() && self.active_node == Some(node) && self.active_column == column
    }
}

/// An open inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Node being edited.
    pub node: NodeId,
    /// Column being edited.
    pub column: usize,
    /// Input control kind.
    pub input: InputKind,
    /// Current value.
    pub value: String,
    /// Value when editing started.
    pub original: String,
}

impl EditSession {
    /// Open an edit seeded with the current value.
    pub fn new(node: NodeId, column: usize, input: InputKind, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            node,
            column,
            input,
            original: value.clone(),
            value,
        }
    }

    /// Whether the value differs from the original.
    pub fn is_dirty(&self) -> bool {
        self.value != self.original
    }

    /// Append typed text.
    ///
    /// Number inputs accept digits, `.` and `-` only. A checkbox input
    /// flips between `true` and `false` on space.
    pub fn insert(&mut self, c: char) {
        match self.input {
            InputKind::Checkbox if c == ' ' => {
                let checked = self.value == "true";
                self.value = (!checked).to_string();
            }
            InputKind::Checkbox => {}
            InputKind::Number if !(c.is_ascii_digit() || c == '.' || c == '-') => {}
            _ => self.value.push(c),
        }
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        self.value.pop();
    }
}
