//! Keys an embedded input control keeps for itself.
//!
//! While a cell is being edited, each key is either left to the input
//! (cursor movement, typing) or forwarded to the grid's action resolver
//! (leaving the cell, moving to another row).

use crate::model::InputKind;
use crossterm::event::KeyCode;

/// Keys the grid may act on while an input has focus.
pub const NAVIGATE_IN_INPUT_KEYS: &[KeyCode] =
    &[KeyCode::Up, KeyCode::Down, KeyCode::Enter, KeyCode::Esc];

const TEXT_KEYS: &[KeyCode] = &[
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::Backspace,
];

const NUMBER_KEYS: &[KeyCode] = &[
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::Backspace,
];

const CHOICE_KEYS: &[KeyCode] = &[KeyCode::Up, KeyCode::Down];

/// Keys the input handles itself.
pub fn input_keys(kind: InputKind) -> &'static [KeyCode] {
    match kind {
        InputKind::Text => TEXT_KEYS,
        InputKind::Number => NUMBER_KEYS,
        InputKind::Checkbox | InputKind::Link => &[],
        InputKind::Radiobutton | InputKind::SelectOne | InputKind::SelectMultiple => CHOICE_KEYS,
    }
}

/// Whether a key pressed inside an input of `kind` reaches the grid.
pub fn forwards_to_grid(kind: InputKind, code: KeyCode) -> bool {
    !input_keys(kind).contains(&code) && NAVIGATE_IN_INPUT_KEYS.contains(&code)
}
