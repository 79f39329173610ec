//! Pointer hit testing and clicks.

use super::events::Origin;
use super::TreeGrid;
use crate::layout::NodeRegion;
use crate::model::NodeId;

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickTarget {
    /// Node of the clicked row.
    pub node: NodeId,
    /// Column index.
    pub column: usize,
    /// Part of the row.
    pub region: NodeRegion,
}

impl TreeGrid {
    /// Find what lies under a position relative to the top-left corner of
    /// the row area (below the header).
    pub fn hit_test(&self, x: u32, y: u32) -> Option<ClickTarget> {
        let index = self.viewport.row_at(y)?;
        let node_id = *self.visible.get(index)?;
        let node = self.tree.get(node_id)?;
        let resolved = self.types.resolve(node, self.options.checkbox);
        let column = if resolved.colspan {
            0
        } else {
            self.geometry.column_at(x).unwrap_or(0)
        };
        let region = if column == 0 {
            let left = self.geometry.get(0).map_or(0, |c| c.offset);
            self.options.title_metrics.region_at(
                x.saturating_sub(left),
                node.level(),
                resolved.checkbox,
                true,
            )
        } else {
            NodeRegion::Column
        };
        Some(ClickTarget {
            node: node_id,
            column,
            region,
        })
    }

    /// Handle a click in the row area.
    ///
    /// The expander toggles expansion and the checkbox toggles selection.
    /// Anywhere else activates the node and, in a cell mode, the column.
    pub fn handle_click(&mut self, x: u32, y: u32) -> Option<ClickTarget> {
        self.as_user(|grid| grid.handle_user_click(x, y))
    }

    fn handle_user_click(&mut self, x: u32, y: u32) -> Option<ClickTarget> {
        let target = self.hit_test(x, y)?;
        match target.region {
            NodeRegion::Expander => {
                let expanded = self
                    .tree
                    .get(target.node)
                    .is_some_and(|n| n.is_expanded());
                self.set_expanded_from(target.node, !expanded, Origin::User);
            }
            NodeRegion::Checkbox => {
                let next = self
                    .tree
                    .get(target.node)
                    .map(|n| n.selection().toggled());
                if let Some(next) = next {
                    self.set_selected_from(target.node, next, Origin::User);
                }
                self.activate_from(target.node, true, Origin::User);
            }
            _ => {
                self.activate_from(target.node, true, Origin::User);
                if self.nav.mode.is_cell_mode() {
                    self.set_column_from(target.column, Origin::User);
                }
            }
        }
        Some(target)
    }
}
