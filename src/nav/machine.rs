//! Mode transitions and generic row navigation as pure functions.
//!
//! [`preempt`] reinterprets directional and mode keys for the current mode
//! before generic navigation sees them. [`navigate_target`] then moves over
//! the visible-node sequence.

use super::state::{NavigationMode, NavigationPolicy, NavigationState};
use crate::model::{Action, InputKind, NodeId, Tree};

/// Facts about the active node that the transition rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFacts {
    /// Children are shown.
    pub expanded: bool,
    /// Has children or a pending lazy load.
    pub expandable: bool,
    /// Input kind of the active column, if the node type makes it editable.
    pub editable_input: Option<InputKind>,
}

impl NodeFacts {
    /// Gather facts for a node.
    pub fn of(tree: &Tree, node: NodeId, editable_input: Option<InputKind>) -> Self {
        tree.get(node)
            .map(|n| Self {
                expanded: n.is_expanded(),
                expandable: n.is_expandable(),
                editable_input,
            })
            .unwrap_or_default()
    }
}

/// Outcome of a pre-emption rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move to another column in the current cell mode.
    SetColumn(usize),
    /// Switch mode.
    EnterMode(NavigationMode),
    /// Expand the active node.
    Expand,
    /// Collapse the active node.
    Collapse,
    /// Open an inline editor on the active cell.
    StartEdit,
    /// Close the editor, keeping its value.
    CommitEdit,
    /// Close the editor, discarding its value.
    CancelEdit,
    /// Consume the action without effect.
    Ignore,
}

/// Apply the pre-emption rules.
///
/// Returns `None` when the action falls through to generic navigation.
pub fn preempt(
    state: &NavigationState,
    policy: NavigationPolicy,
    action: Action,
    facts: Option<NodeFacts>,
    column_count: usize,
) -> Option<Decision> {
    let last_column = column_count.saturating_sub(1);
    let col = state.active_column;
    match state.mode {
        NavigationMode::CellEdit => match action {
            Action::Escape => Some(Decision::CancelEdit),
            Action::Enter => Some(Decision::CommitEdit),
            // Leaving the row commits through the active node change.
            Action::Up | Action::Down | Action::PageUp | Action::PageDown => None,
            _ => Some(Decision::Ignore),
        },
        NavigationMode::CellNav => match action {
            Action::Left if col > 0 => Some(Decision::SetColumn(col - 1)),
            Action::Left | Action::Escape if policy.allows_row() => {
                Some(Decision::EnterMode(NavigationMode::Row))
            }
            Action::Left | Action::Escape => Some(Decision::Ignore),
            Action::Right if col < last_column => Some(Decision::SetColumn(col + 1)),
            Action::Right => Some(Decision::Ignore),
            Action::FirstColumn => Some(Decision::SetColumn(0)),
            Action::LastColumn => Some(Decision::SetColumn(last_column)),
            Action::Enter if col == 0 && facts.is_some_and(|f| f.expandable) => {
                Some(Decision::StartEdit)
            }
            Action::Edit if col == 0 && facts.is_some() => Some(Decision::StartEdit),
            Action::Enter | Action::Edit
                if col > 0 && facts.is_some_and(|f| f.editable_input.is_some()) =>
            {
                Some(Decision::StartEdit)
            }
            Action::Edit => Some(Decision::Ignore),
            _ => None,
        },
        NavigationMode::Row => {
            let facts = facts?;
            match action {
                Action::Left if facts.expanded && facts.expandable => Some(Decision::Collapse),
                Action::Right if !facts.expanded && facts.expandable => Some(Decision::Expand),
                Action::Right if policy.allows_cell() => {
                    Some(Decision::EnterMode(NavigationMode::CellNav))
                }
                _ => None,
            }
        }
    }
}

/// Where generic navigation moves the active node.
///
/// Returns `None` when there is nowhere to go. Without an active node,
/// every movement lands on the first visible row.
pub fn navigate_target(
    tree: &Tree,
    visible: &[NodeId],
    current: Option<NodeId>,
    action: Action,
    page_rows: usize,
) -> Option<NodeId> {
    let last = visible.len().checked_sub(1)?;
    let Some(current) = current else {
        return action.is_movement().then(|| visible[0]);
    };
    let index = visible.iter().position(|n| *n == current);
    let target_index = match (action, index) {
        (Action::First | Action::FirstColumn, _) => Some(0),
        (Action::Last | Action::LastColumn, _) => Some(last),
        (_, None) => return Some(visible[0]),
        (Action::Up, Some(i)) => i.checked_sub(1),
        (Action::Down, Some(i)) => (i < last).then_some(i + 1),
        (Action::PageUp, Some(i)) => Some(i.saturating_sub(page_rows.max(1))),
        (Action::PageDown, Some(i)) => Some((i + page_rows.max(1)).min(last)),
        (Action::Left | Action::Parent, Some(_)) => {
            return tree
                .get(current)
                .and_then(|n| n.parent())
                .filter(|p| visible.contains(p));
        }
        (Action::Right, Some(i)) => {
            let node = tree.get(current)?;
            let child = *node.children().first()?;
            return (node.is_expanded() && visible.get(i + 1) == Some(&child)).then_some(child);
        }
        _ => None,
    };
    target_index
        .map(|i| visible[i])
        .filter(|target| *target != current)
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
