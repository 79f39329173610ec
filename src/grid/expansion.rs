//! Expansion, lazy loading, selection and filtering.

use super::events::{GridEvent, Origin};
use super::TreeGrid;
use crate::model::{Action, LoadError, NodeId, NodeSpec, NodeStatus, Selection, TreeError};
use crate::render::{ChangeKind, ChangeScope};
use tracing::{debug, info, warn};

/// Above this many changed checkboxes a single tree-wide refresh is cheaper.
const NODE_REFRESH_LIMIT: usize = 32;

impl TreeGrid {
    /// Expand or collapse a node.
    ///
    /// Expanding an unloaded lazy node starts a load and emits
    /// [`GridEvent::LoadRequested`]. Nodes that are not expandable are
    /// left alone.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn set_expanded(&mut self, node: NodeId, expanded: bool) -> Result<bool, TreeError> {
        self.tree.node(node)?;
        Ok(self.set_expanded_from(node, expanded, Origin::Api))
    }

    pub(crate) fn set_expanded_from(&mut self, id: NodeId, expanded: bool, origin: Origin) -> bool {
        let Ok(node) = self.tree.node_mut(id) else {
            return false;
        };
        if !node.is_expandable() {
            let action = if expanded {
                Action::Expand
            } else {
                Action::Collapse
            };
            self.log_noop(action, "node has no children");
            return false;
        }
        if node.expanded == expanded {
            return false;
        }

        if node.lazy && expanded {
            node.load_generation += 1;
            node.status = NodeStatus::Loading;
            node.status_message = None;
            node.expanded = true;
            let generation = node.load_generation;
            debug!(node = %id, generation, "lazy load requested");
            self.request(ChangeKind::Data, ChangeScope::Node(id));
            self.events.push(GridEvent::LoadRequested {
                node: id,
                generation,
                origin,
            });
            return true;
        }
        if node.status == NodeStatus::Loading {
            // Supersede the pending load.
            node.load_generation += 1;
            node.status = NodeStatus::Ok;
            node.expanded = false;
            debug!(node = %id, generation = node.load_generation, "lazy load cancelled");
            self.request(ChangeKind::Data, ChangeScope::Node(id));
            self.events.push(GridEvent::Expanded {
                node: id,
                expanded: false,
                origin,
            });
            return true;
        }

        node.expanded = expanded;
        if !expanded
            && self
                .nav
                .active_node
                .is_some_and(|active| self.tree.is_descendant_of(active, id))
        {
            self.change_active(Some(id), self.options.auto_activate, origin);
        }
        self.structure_changed();
        self.events.push(GridEvent::Expanded {
            node: id,
            expanded,
            origin,
        });
        true
    }

    /// Expand every loaded node. Lazy nodes are not loaded.
    ///
    /// Returns the number of nodes that changed.
    pub fn expand_all(&mut self) -> usize {
        let changed = self.tree.set_expanded_all(true).len();
        if changed > 0 {
            info!(changed, "expanded all nodes");
            self.structure_changed();
        }
        changed
    }

    /// Collapse every node. The active node moves to its top-level
    /// ancestor if it disappears.
    ///
    /// Returns the number of nodes that changed.
    pub fn collapse_all(&mut self) -> usize {
        let changed = self.tree.set_expanded_all(false).len();
        if changed == 0 {
            return 0;
        }
        info!(changed, "collapsed all nodes");
        if let Some(active) = self.nav.active_node {
            if let Some(root) = self.tree.ancestors(active).last() {
                self.change_active(Some(root), self.options.auto_activate, Origin::Api);
            }
        }
        self.structure_changed();
        changed
    }

    /// Deliver the result of a lazy load.
    ///
    /// Results for a superseded generation, or for a node that is no
    /// longer loading, are discarded and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn resolve_lazy_load(
        &mut self,
        id: NodeId,
        generation: u64,
        result: Result<Vec<NodeSpec>, LoadError>,
    ) -> Result<bool, TreeError> {
        let node = self.tree.node(id)?;
        if node.load_generation() != generation || node.status() != NodeStatus::Loading {
            debug!(
                node = %id,
                generation,
                current = node.load_generation(),
                "stale lazy load result discarded"
            );
            return Ok(false);
        }
        let inherit = self.options.cascade_select && node.selection() == Selection::Checked;

        let outcome = result.and_then(|specs| {
            self.tree
                .add_children(Some(id), specs)
                .map_err(|err| LoadError::new(err.to_string()))
        });
        match outcome {
            Ok(children) => {
                let node = self.tree.node_mut(id)?;
                node.lazy = false;
                node.expanded = true;
                node.status = if children.is_empty() {
                    NodeStatus::NoData
                } else {
                    NodeStatus::Ok
                };
                if inherit {
                    self.tree.set_selection(id, Selection::Checked, true)?;
                }
                info!(node = %id, generation, children = children.len(), "lazy load resolved");
                self.structure_changed();
                self.events.push(GridEvent::Expanded {
                    node: id,
                    expanded: true,
                    origin: Origin::Api,
                });
            }
            Err(err) => {
                let node = self.tree.node_mut(id)?;
                node.status = NodeStatus::Error;
                node.status_message = Some(err.message.clone());
                node.expanded = false;
                warn!(node = %id, generation, error = %err, "lazy load failed");
                self.request(ChangeKind::Data, ChangeScope::Node(id));
            }
        }
        Ok(true)
    }

    /// Set a checkbox value, cascading when configured.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn set_selected(&mut self, node: NodeId, selection: Selection) -> Result<bool, TreeError> {
        self.tree.node(node)?;
        Ok(self.set_selected_from(node, selection, Origin::Api))
    }

    /// Flip a checkbox value.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn toggle_selected(&mut self, node: NodeId) -> Result<bool, TreeError> {
        let next = self.tree.node(node)?.selection().toggled();
        Ok(self.set_selected_from(node, next, Origin::Api))
    }

    pub(crate) fn set_selected_from(
        &mut self,
        node: NodeId,
        selection: Selection,
        origin: Origin,
    ) -> bool {
        let changed = match self
            .tree
            .set_selection(node, selection, self.options.cascade_select)
        {
            Ok(changed) => changed,
            Err(err) => {
                warn!(node = %node, error = %err, "selection rejected");
                return false;
            }
        };
        if changed.is_empty() {
            return false;
        }
        if changed.len() > NODE_REFRESH_LIMIT {
            self.request(ChangeKind::Status, ChangeScope::Tree);
        } else {
            for id in &changed {
                self.request(ChangeKind::Status, ChangeScope::Node(*id));
            }
        }
        self.events.push(GridEvent::SelectionChanged {
            node,
            selection,
            changed,
            origin,
        });
        true
    }

    /// Mark a node as filtered out or back in.
    ///
    /// Hiding the active node or one of its ancestors moves the active
    /// node to the nearest row still shown above it, or below it if there
    /// is none.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for ids from another tree.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<bool, TreeError> {
        let changed = self.tree.set_hidden(node, hidden)?;
        if !changed {
            return Ok(false);
        }
        let relocate = self
            .nav
            .active_node
            .filter(|active| {
                hidden && (*active == node || self.tree.is_descendant_of(*active, node))
            })
            .map(|active| self.nearest_shown(active, node));
        self.structure_changed();
        if let Some(target) = relocate {
            debug!(hidden = %node, target = ?target, "active node hidden");
            self.change_active(target, self.options.auto_activate, Origin::Api);
        }
        Ok(true)
    }

    /// The closest row around `active` that survives hiding `hidden`.
    /// Reads the visible order from before the hide.
    fn nearest_shown(&self, active: NodeId, hidden: NodeId) -> Option<NodeId> {
        let survives = |id: NodeId| id != hidden && !self.tree.is_descendant_of(id, hidden);
        let position = self.visible.iter().position(|id| *id == active)?;
        let (before, after) = self.visible.split_at(position);
        before
            .iter()
            .rev()
            .find(|id| survives(**id))
            .or_else(|| after.iter().find(|id| survives(**id)))
            .copied()
    }
}

#[cfg(test)]
#[path = "expansion_tests.rs"]
mod tests;
