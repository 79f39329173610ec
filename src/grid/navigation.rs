//! Modes, the active cell, key dispatch and inline editing.

use super::events::{GridEvent, Origin};
use super::TreeGrid;
use crate::input::forwards_to_grid;
use crate::model::{Action, InputKind, NodeId, TreeError};
use crate::nav::{EditSession, KeyContext, NavigationMode, NavigationPolicy};
use crate::render::{ChangeKind, ChangeScope};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::Value;
use tracing::{debug, trace};

/// Options for [`TreeGrid::set_active_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateOptions {
    /// Activate the node rather than only moving the cursor.
    pub activate: bool,
    /// Also set the active column.
    pub column: Option<usize>,
}

impl Default for ActivateOptions {
    fn default() -> Self {
        Self {
            activate: true,
            column: None,
        }
    }
}

impl TreeGrid {
    /// Change the navigation policy, leaving any mode it forbids.
    pub fn set_navigation_mode(&mut self, policy: NavigationPolicy) {
        self.options.navigation = policy;
        if self.nav.mode == NavigationMode::CellEdit && !policy.allows_cell() {
            self.commit_edit();
        }
        let mode = policy.conform(self.nav.mode);
        self.set_mode(mode, Origin::Api);
    }

    /// Switch mode, if the policy allows it.
    ///
    /// Entering [`NavigationMode::CellEdit`] opens an editor on the active
    /// cell. Leaving it commits the edit.
    pub fn enter_mode(&mut self, mode: NavigationMode) -> bool {
        self.enter_mode_from(mode, Origin::Api)
    }

    pub(crate) fn enter_mode_from(&mut self, mode: NavigationMode, origin: Origin) -> bool {
        if mode == NavigationMode::CellEdit {
            return self.start_edit_from(origin);
        }
        if self.options.navigation.conform(mode) != mode || self.nav.mode == mode {
            return false;
        }
        let committed = self.nav.mode == NavigationMode::CellEdit && self.commit_edit_from(origin);
        self.set_mode(mode, origin) || committed
    }

    fn set_mode(&mut self, mode: NavigationMode, origin: Origin) -> bool {
        let from = self.nav.mode;
        if from == mode {
            return false;
        }
        self.nav.mode = mode;
        if from == NavigationMode::Row && mode.is_cell_mode() && self.nav.active_column != 0 {
            self.nav.active_column = 0;
            self.events.push(GridEvent::ColumnChanged {
                node: self.nav.active_node,
                column: 0,
                origin,
            });
        }
        let scope = self.nav.active_node.map_or(ChangeScope::Tree, ChangeScope::Node);
        self.request(ChangeKind::Status, scope);
        debug!(%from, to = %mode, ?origin, "navigation mode changed");
        self.events.push(GridEvent::ModeChanged {
            from,
            to: mode,
            origin,
        });
        true
    }

    /// Run an action through the key handler chain.
    ///
    /// `activate` defaults to the `auto_activate` option. Returns whether
    /// some handler applied the action.
    pub fn navigate(&mut self, action: Action, activate: Option<bool>) -> bool {
        let activate = activate.unwrap_or(self.options.auto_activate);
        self.dispatch(KeyContext::api(action, activate))
    }

    /// Apply actions in order. Returns how many were applied.
    pub fn navigate_batch(&mut self, actions: &[Action]) -> usize {
        let mut applied = 0;
        for action in actions {
            if self.navigate(*action, None) {
                applied += 1;
            }
        }
        applied
    }

    /// Handle a key press from the terminal.
    ///
    /// While a cell is edited, keys the input keeps are applied to the
    /// editor. Everything else is resolved to an action and dispatched.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.as_user(|grid| grid.handle_user_key(key))
    }

    fn handle_user_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if let Some(edit) = self.edit.as_mut() {
            if !forwards_to_grid(edit.input, key.code) {
                let typed = !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                match key.code {
                    KeyCode::Char(c) if typed => edit.insert(c),
                    KeyCode::Backspace => edit.backspace(),
                    _ => return false,
                }
                let node = edit.node;
                self.request(ChangeKind::Status, ChangeScope::Node(node));
                return true;
            }
        }
        let Some(command) = self.bindings.resolve(&key) else {
            trace!(code = ?key.code, modifiers = ?key.modifiers, "unbound key");
            return false;
        };
        self.dispatch(KeyContext {
            key: Some(key),
            action: command.action,
            activate: command.activate && self.options.auto_activate,
            origin: Origin::User,
        })
    }

    fn dispatch(&mut self, ctx: KeyContext) -> bool {
        let handlers = self.handlers.clone();
        for handler in &handlers {
            if handler.handle_key(self, &ctx) {
                return true;
            }
        }
        self.log_noop(ctx.action, "no handler applied");
        false
    }

    /// Make `node` the active node, expanding collapsed ancestors.
    ///
    /// Returns whether the active node or column changed.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn set_active_node(
        &mut self,
        node: Option<NodeId>,
        options: ActivateOptions,
    ) -> Result<bool, TreeError> {
        if let Some(node) = node {
            self.tree.node(node)?;
            let hidden: Vec<NodeId> = self
                .tree
                .ancestors(node)
                .filter(|a| self.tree.get(*a).is_some_and(|n| !n.is_expanded()))
                .collect();
            for ancestor in hidden.into_iter().rev() {
                self.set_expanded_from(ancestor, true, Origin::Api);
            }
        }
        let changed = self.nav.active_node != node;
        if changed {
            self.change_active(node, options.activate, Origin::Api);
        }
        let column_changed = options
            .column
            .is_some_and(|column| self.set_column_from(column, Origin::Api));
        Ok(changed || column_changed)
    }

    pub(crate) fn activate_from(&mut self, node: NodeId, activate: bool, origin: Origin) -> bool {
        if self.nav.active_node == Some(node) {
            return false;
        }
        self.change_active(Some(node), activate, origin);
        true
    }

    pub(crate) fn change_active(&mut self, node: Option<NodeId>, activate: bool, origin: Origin) {
        if self.edit.is_some() {
            self.commit_edit_from(origin);
        }
        let previous = std::mem::replace(&mut self.nav.active_node, node);
        for id in previous.into_iter().chain(node) {
            self.request(ChangeKind::Status, ChangeScope::Node(id));
        }
        if let Some(node) = node {
            self.scroll_to(node);
        }
        self.events.push(GridEvent::ActiveNodeChanged {
            node,
            previous,
            activated: activate,
            origin,
        });
    }

    /// Set the active column, clamped to the column count.
    pub fn set_column(&mut self, index: usize) -> bool {
        self.set_column_from(index, Origin::Api)
    }

    pub(crate) fn set_column_from(&mut self, index: usize, origin: Origin) -> bool {
        let index = index.min(self.column_count().saturating_sub(1));
        if index == self.nav.active_column {
            return false;
        }
        if self.edit.is_some() {
            self.commit_edit_from(origin);
        }
        self.nav.active_column = index;
        let scope = self.nav.active_node.map_or(ChangeScope::Tree, ChangeScope::Node);
        self.request(ChangeKind::Status, scope);
        self.events.push(GridEvent::ColumnChanged {
            node: self.nav.active_node,
            column: index,
            origin,
        });
        true
    }

    // ===== Inline editing =====

    /// Open an editor on the active cell.
    ///
    /// The title column is always editable as text. Other columns need a
    /// node type that declares an input for them.
    pub fn start_edit(&mut self) -> bool {
        self.start_edit_from(Origin::Api)
    }

    pub(crate) fn start_edit_from(&mut self, origin: Origin) -> bool {
        if self.edit.is_some() || !self.options.navigation.allows_cell() {
            return false;
        }
        let Some(node_id) = self.nav.active_node else {
            return false;
        };
        let column_index = match self.nav.mode {
            NavigationMode::Row => 0,
            _ => self.nav.active_column,
        };
        let (Some(node), Some(column)) = (self.tree.get(node_id), self.columns.get(column_index))
        else {
            return false;
        };
        let session = if column_index == 0 {
            EditSession::new(node_id, column_index, InputKind::Text, node.title())
        } else {
            let Some(input) = self.types.editable_input(node, &column.id) else {
                return false;
            };
            let value = match node.data().get(&column.id) {
                Some(Value::String(text)) => text.clone(),
                None | Some(Value::Null) => String::new(),
                Some(other) => other.to_string(),
            };
            EditSession::new(node_id, column_index, input, value)
        };
        self.edit = Some(session);
        self.set_mode(NavigationMode::CellEdit, origin);
        self.nav.active_column = column_index;
        self.request(ChangeKind::Status, ChangeScope::Node(node_id));
        self.events.push(GridEvent::EditStarted {
            node: node_id,
            column: column_index,
            origin,
        });
        true
    }

    /// Close the editor and write its value.
    pub fn commit_edit(&mut self) -> bool {
        self.commit_edit_from(Origin::Api)
    }

    pub(crate) fn commit_edit_from(&mut self, origin: Origin) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        let column_id = self.columns.get(edit.column).map(|c| c.id.clone());
        if let Ok(node) = self.tree.node_mut(edit.node) {
            match column_id {
                Some(_) if edit.column == 0 => node.title = edit.value.clone(),
                Some(id) => {
                    node.data.insert(id, edit_value(edit.input, &edit.value));
                }
                None => {}
            }
        }
        self.request(ChangeKind::Data, ChangeScope::Node(edit.node));
        self.set_mode(NavigationMode::CellNav, origin);
        debug!(node = %edit.node, column = edit.column, dirty = edit.is_dirty(), "edit committed");
        self.events.push(GridEvent::EditCommitted {
            node: edit.node,
            column: edit.column,
            value: edit.value,
            origin,
        });
        true
    }

    /// Close the editor, discarding its value.
    pub fn cancel_edit(&mut self) -> bool {
        self.cancel_edit_from(Origin::Api)
    }

    pub(crate) fn cancel_edit_from(&mut self, origin: Origin) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };
        self.request(ChangeKind::Status, ChangeScope::Node(edit.node));
        self.set_mode(NavigationMode::CellNav, origin);
        self.events.push(GridEvent::EditCancelled {
            node: edit.node,
            column: edit.column,
            origin,
        });
        true
    }
}

/// Convert edited text back into a data value for the input kind.
fn edit_value(input: InputKind, text: &str) -> Value {
    match input {
        InputKind::Number => text
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| text.parse::<f64>().map(Value::from))
            .unwrap_or_else(|_| Value::String(text.to_string())),
        InputKind::Checkbox => Value::Bool(text == "true"),
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
