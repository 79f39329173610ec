//! Ordered key handler chain.
//!
//! Each handler sees a resolved action and may consume it. The grid runs
//! host handlers first, then [`PreemptionHandler`], then
//! [`GenericNavigationHandler`]. The first handler returning `true` stops
//! the chain.

use super::machine::{navigate_target, preempt, Decision};
use super::state::NavigationMode;
use crate::grid::{Origin, TreeGrid};
use crate::model::{Action, Selection};
use crossterm::event::KeyEvent;

/// A resolved key press travelling down the handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    /// Raw key, absent for API-driven actions.
    pub key: Option<KeyEvent>,
    /// Canonical action.
    pub action: Action,
    /// Whether moving onto a node activates it.
    pub activate: bool,
    /// Who triggered the action.
    pub origin: Origin,
}

impl KeyContext {
    /// Context for an action issued through the API.
    pub fn api(action: Action, activate: bool) -> Self {
        Self {
            key: None,
            action,
            activate,
            origin: Origin::Api,
        }
    }
}

/// A link in the key handler chain.
pub trait KeyHandler: Send + Sync {
    /// Handle the action. Returns `true` to stop the chain.
    fn handle_key(&self, grid: &mut TreeGrid, ctx: &KeyContext) -> bool;
}

/// Mode-sensitive reinterpretation of directional and mode keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreemptionHandler;

impl KeyHandler for PreemptionHandler {
    fn handle_key(&self, grid: &mut TreeGrid, ctx: &KeyContext) -> bool {
        let facts = grid.active_facts();
        let Some(decision) = preempt(
            grid.nav(),
            grid.policy(),
            ctx.action,
            facts,
            grid.column_count(),
        ) else {
            return false;
        };
        let applied = match (decision, grid.active_node()) {
            (Decision::SetColumn(column), _) => grid.set_column_from(column, ctx.origin),
            (Decision::EnterMode(mode), _) => grid.enter_mode_from(mode, ctx.origin),
            (Decision::Expand, Some(node)) => grid.set_expanded_from(node, true, ctx.origin),
            (Decision::Collapse, Some(node)) => grid.set_expanded_from(node, false, ctx.origin),
            (Decision::Expand | Decision::Collapse, None) => false,
            (Decision::StartEdit, _) => grid.start_edit_from(ctx.origin),
            (Decision::CommitEdit, _) => grid.commit_edit_from(ctx.origin),
            (Decision::CancelEdit, _) => grid.cancel_edit_from(ctx.origin),
            (Decision::Ignore, _) => false,
        };
        if !applied {
            grid.log_noop(ctx.action, "rejected in current mode");
        }
        true
    }
}

/// Row movement, expansion and selection over the visible-node sequence.
///
/// Enter in row mode activates the active node again without moving.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericNavigationHandler;

impl KeyHandler for GenericNavigationHandler {
    fn handle_key(&self, grid: &mut TreeGrid, ctx: &KeyContext) -> bool {
        let active = grid.active_node();
        let origin = ctx.origin;
        match (ctx.action, active) {
            (action, _) if action.is_movement() => {
                let target = navigate_target(
                    grid.tree(),
                    grid.visible_nodes(),
                    active,
                    action,
                    grid.viewport().page_rows(),
                );
                match target {
                    Some(node) => grid.activate_from(node, ctx.activate, origin),
                    None => false,
                }
            }
            (Action::Expand, Some(node)) => grid.set_expanded_from(node, true, origin),
            (Action::Collapse, Some(node)) => grid.set_expanded_from(node, false, origin),
            (Action::ExpandAll, _) => grid.expand_all() > 0,
            (Action::CollapseAll, _) => grid.collapse_all() > 0,
            (Action::ToggleSelect, Some(node)) => {
                let next = grid
                    .tree()
                    .get(node)
                    .map_or(Selection::Checked, |n| n.selection().toggled());
                grid.set_selected_from(node, next, origin)
            }
            (Action::Enter, Some(node)) if grid.mode() == NavigationMode::Row => {
                grid.change_active(Some(node), true, origin);
                true
            }
            _ => false,
        }
    }
}
