//! Canonical navigation actions, independent of the keys that trigger them.

/// A navigation or editing intent.
///
/// The mapping from key events to actions lives in
/// [`input::KeyBindings`](crate::input::KeyBindings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Row movement
    /// Previous node in display order. Default: ↑
    Up,
    /// Next node in display order. Default: ↓
    Down,
    /// Previous column, collapse, or parent depending on mode. Default: ←
    Left,
    /// Next column, expand, or first child depending on mode. Default: →
    Right,
    /// One page of rows up. Default: Page Up
    PageUp,
    /// One page of rows down. Default: Page Down
    PageDown,
    /// First node. Default: Ctrl+Home / Meta+↑
    First,
    /// Last node. Default: Ctrl+End / Meta+↓
    Last,
    /// First column in cell modes, first node in row mode. Default: Home
    FirstColumn,
    /// Last column in cell modes, last node in row mode. Default: End
    LastColumn,
    /// Parent node. Default: Backspace
    Parent,

    // Expansion
    /// Expand the active node. Default: +
    Expand,
    /// Collapse the active node. Default: -
    Collapse,
    /// Expand every loaded node. Default: *
    ExpandAll,
    /// Collapse every node. Default: /
    CollapseAll,

    // Selection and modes
    /// Toggle the active node's checkbox. Default: Space
    ToggleSelect,
    /// Activate, or start editing in cell mode. Default: Enter
    Enter,
    /// Leave the current cell mode. Default: Esc
    Escape,
    /// Start editing the active cell. Default: F2
    Edit,
}

impl Action {
    /// Whether the action moves the active node.
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Self::Up
                | Self::Down
                | Self::Left
                | Self::Right
                | Self::PageUp
                | Self::PageDown
                | Self::First
                | Self::Last
                | Self::FirstColumn
                | Self::LastColumn
                | Self::Parent
        )
    }
}
