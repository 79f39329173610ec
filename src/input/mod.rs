//! Keyboard input: action resolution and input-control key filtering.

pub mod allow_list;
pub mod bindings;

pub use allow_list::{forwards_to_grid, input_keys, NAVIGATE_IN_INPUT_KEYS};
pub use bindings::{KeyBindings, KeyCommand};
