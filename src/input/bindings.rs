//! Keyboard action resolver.
//!
//! A static table maps a physical key plus modifiers to a canonical
//! [`Action`]. The resolver knows nothing about modes; reinterpretation
//! happens in the navigation handler chain.

use crate::model::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// A resolved key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCommand {
    /// Canonical action.
    pub action: Action,
    /// Whether moving onto a node also activates it. Control-modified
    /// movement only moves the cursor.
    pub activate: bool,
}

/// Maps key events to actions.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<(KeyCode, KeyModifiers), Action>,
}

impl KeyBindings {
    /// Look up the action bound to an exact key and modifier set.
    pub fn get(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        self.bindings.get(&(code, modifiers)).copied()
    }

    /// Bind a key, replacing any existing binding.
    pub fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: Action) {
        self.bindings.insert((code, modifiers), action);
    }

    /// Resolve a key event.
    ///
    /// Shift is ignored on character keys, since `+` and `*` usually
    /// arrive shifted. Control on an unbound movement key falls back to
    /// the plain binding without activation.
    pub fn resolve(&self, event: &KeyEvent) -> Option<KeyCommand> {
        let mut modifiers = event.modifiers;
        if matches!(event.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        if let Some(action) = self.get(event.code, modifiers) {
            return Some(KeyCommand {
                action,
                activate: true,
            });
        }
        if modifiers.contains(KeyModifiers::CONTROL) {
            let plain = modifiers.difference(KeyModifiers::CONTROL);
            if let Some(action) = self.get(event.code, plain).filter(|a| a.is_movement()) {
                return Some(KeyCommand {
                    action,
                    activate: false,
                });
            }
        }
        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let none = KeyModifiers::NONE;
        let mut bindings = HashMap::new();

        // Arrow keys
        bindings.insert((KeyCode::Up, none), Action::Up);
        bindings.insert((KeyCode::Down, none), Action::Down);
        bindings.insert((KeyCode::Left, none), Action::Left);
        bindings.insert((KeyCode::Right, none), Action::Right);

        // Paging and jumps
        bindings.insert((KeyCode::PageUp, none), Action::PageUp);
        bindings.insert((KeyCode::PageDown, none), Action::PageDown);
        bindings.insert((KeyCode::Home, none), Action::FirstColumn);
        bindings.insert((KeyCode::End, none), Action::LastColumn);
        bindings.insert((KeyCode::Home, KeyModifiers::CONTROL), Action::First);
        bindings.insert((KeyCode::End, KeyModifiers::CONTROL), Action::Last);
        for meta in [KeyModifiers::META, KeyModifiers::SUPER] {
            bindings.insert((KeyCode::Up, meta), Action::First);
            bindings.insert((KeyCode::Down, meta), Action::Last);
        }
        bindings.insert((KeyCode::Backspace, none), Action::Parent);

        // Expansion. Keypad keys arrive as the same characters.
        bindings.insert((KeyCode::Char('+'), none), Action::Expand);
        bindings.insert((KeyCode::Char('-'), none), Action::Collapse);
        bindings.insert((KeyCode::Char('*'), none), Action::ExpandAll);
        bindings.insert((KeyCode::Char('/'), none), Action::CollapseAll);

        // Selection and modes
        bindings.insert((KeyCode::Char(' '), none), Action::ToggleSelect);
        bindings.insert((KeyCode::Enter, none), Action::Enter);
        bindings.insert((KeyCode::Esc, none), Action::Escape);
        bindings.insert((KeyCode::F(2), none), Action::Edit);

        Self { bindings }
    }
}
