//! Pooled row elements and how their content is produced.
//!
//! A [`RowElement`] is the surface-independent description of one visible
//! row. Elements are recycled by the [`Viewport`](super::Viewport): when a
//! row leaves the materialized range its element returns to the pool and is
//! later refilled for a different node.

use super::cell::CellSource;
use crate::layout::{ColumnDef, ColumnGeometry};
use crate::model::{Node, NodeId, NodeStatus, NodeTypeRegistry, RenderError, Selection, Tree};
use crate::nav::{EditSession, NavigationState};

/// Everything a row needs to render itself.
pub struct RenderContext<'a> {
    /// Node tree.
    pub tree: &'a Tree,
    /// Column declarations.
    pub columns: &'a [ColumnDef],
    /// Resolved column geometry.
    pub geometry: &'a ColumnGeometry,
    /// Node type registry.
    pub types: &'a NodeTypeRegistry,
    /// Cell content source.
    pub source: &'a dyn CellSource,
    /// Navigation state.
    pub nav: &'a NavigationState,
    /// Open inline edit, if any.
    pub edit: Option<&'a EditSession>,
    /// Whether checkboxes are shown by default.
    pub checkbox: bool,
}

/// Stable identity of a pooled element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// State of the expand/collapse toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expander {
    /// Leaf, no toggle.
    #[default]
    None,
    /// Children hidden.
    Collapsed,
    /// Children shown.
    Expanded,
    /// Lazy load in flight.
    Loading,
}

/// State classes of a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowClasses {
    /// Row holds the active node.
    pub active: bool,
    /// Active and the grid has focus.
    pub focused: bool,
    /// Active in a cell mode.
    pub cell_mode: bool,
    /// Checkbox checked.
    pub checked: bool,
    /// Checkbox partially checked.
    pub partial: bool,
    /// Node is loading children.
    pub loading: bool,
    /// Node or row content failed.
    pub error: bool,
    /// Lazy load returned nothing.
    pub no_data: bool,
    /// Classes from the node type.
    pub extra: Vec<String>,
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellElement {
    /// Column index.
    pub column: usize,
    /// Left edge.
    pub left: u32,
    /// Width.
    pub width: u32,
    /// Text. Empty for the title column, whose content lives on the row.
    pub text: String,
    /// Cell is the active cell.
    pub active: bool,
    /// Cell hosts the open editor.
    pub editing: bool,
}

/// Update counters, used to observe what a flush touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowUpdates {
    /// Full rebuilds.
    pub rebuilds: u32,
    /// Content refreshes.
    pub data: u32,
    /// Class refreshes.
    pub status: u32,
    /// Position changes.
    pub moves: u32,
}

/// Visual description of one materialized row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowElement {
    id: ElementId,
    node: Option<NodeId>,
    row_index: usize,
    top: u32,
    level: usize,
    title: String,
    icon: String,
    expander: Expander,
    checkbox: Option<Selection>,
    colspan: bool,
    classes: RowClasses,
    cells: Vec<CellElement>,
    error: Option<String>,
    updates: RowUpdates,
}

impl RowElement {
    pub(crate) fn new(id: ElementId) -> Self {
        Self {
            id,
            node: None,
            row_index: 0,
            top: 0,
            level: 0,
            title: String::new(),
            icon: String::new(),
            expander: Expander::None,
            checkbox: None,
            colspan: false,
            classes: RowClasses::default(),
            cells: Vec::new(),
            error: None,
            updates: RowUpdates::default(),
        }
    }

    /// Element identity, stable across recycling.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Node currently shown, `None` while pooled.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Index in the visible-node sequence.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Absolute vertical offset, `row_index × row_height`.
    pub fn top(&self) -> u32 {
        self.top
    }

    /// Tree depth.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Title text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Icon name.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Expander state.
    pub fn expander(&self) -> Expander {
        self.expander
    }

    /// Checkbox value, `None` when no checkbox is drawn.
    pub fn checkbox(&self) -> Option<Selection> {
        self.checkbox
    }

    /// Whether the title spans the full row.
    pub fn is_colspan(&self) -> bool {
        self.colspan
    }

    /// State classes.
    pub fn classes(&self) -> &RowClasses {
        &self.classes
    }

    /// Cells in column order. Empty for colspan rows.
    pub fn cells(&self) -> &[CellElement] {
        &self.cells
    }

    /// Render or status error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Update counters since the element was last filled.
    pub fn updates(&self) -> RowUpdates {
        self.updates
    }

    pub(crate) fn release(&mut self) {
        self.node = None;
        self.cells.clear();
        self.error = None;
        self.classes = RowClasses::default();
    }

    /// Move the row. Returns whether the position changed.
    pub(crate) fn reposition(&mut self, row_index: usize, row_height: u32) -> bool {
        let top = (row_index as u32).saturating_mul(row_height);
        if self.row_index == row_index && self.top == top {
            return false;
        }
        self.row_index = row_index;
        self.top = top;
        self.updates.moves += 1;
        true
    }

    /// Fill the row from scratch for `node`, rebuilding cells from the
    /// current geometry.
    pub(crate) fn fill(
        &mut self,
        ctx: &RenderContext<'_>,
        node_id: NodeId,
        row_index: usize,
        row_height: u32,
    ) -> Result<(), RenderError> {
        self.node = Some(node_id);
        self.reposition(row_index, row_height);
        self.updates = RowUpdates {
            rebuilds: 1,
            ..RowUpdates::default()
        };
        let Some(node) = ctx.tree.get(node_id) else {
            return Ok(());
        };
        self.colspan = ctx.types.resolve(node, ctx.checkbox).colspan;
        self.cells = if self.colspan {
            Vec::new()
        } else {
            ctx.geometry
                .columns()
                .iter()
                .enumerate()
                .map(|(column, layout)| CellElement {
                    column,
                    left: layout.offset,
                    width: layout.width,
                    text: String::new(),
                    active: false,
                    editing: false,
                })
                .collect()
        };
        self.apply_data(ctx, node)
    }

    /// Refresh title, icon and cell text without touching cell geometry.
    pub(crate) fn refresh_data(&mut self, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        let Some(node) = self.node.and_then(|id| ctx.tree.get(id)) else {
            return Ok(());
        };
        self.updates.data += 1;
        self.apply_data(ctx, node)
    }

    fn apply_data(&mut self, ctx: &RenderContext<'_>, node: &Node) -> Result<(), RenderError> {
        let resolved = ctx.types.resolve(node, ctx.checkbox);
        self.level = node.level();
        self.title = node.title().to_string();
        self.icon = resolved.icon.clone().unwrap_or_else(|| {
            match (node.is_expandable(), node.is_expanded()) {
                (true, true) => "folder-open",
                (true, false) => "folder",
                (false, _) => "doc",
            }
            .to_string()
        });
        self.classes.extra = resolved.classes;
        self.error = None;

        let mut failure = None;
        for cell in self.cells.iter_mut().filter(|c| c.column > 0) {
            let Some(column) = ctx.columns.get(cell.column) else {
                continue;
            };
            match ctx.source.cell_text(node, column) {
                Ok(text) => cell.text = text,
                Err(err) => {
                    cell.text.clear();
                    failure.get_or_insert(err);
                }
            }
        }
        self.apply_status(ctx, node);

        match failure {
            Some(err) => {
                self.error = Some(err.to_string());
                self.classes.error = true;
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Refresh state classes, checkbox, expander and active cell markers.
    pub(crate) fn refresh_status(&mut self, ctx: &RenderContext<'_>) {
        let Some(node) = self.node.and_then(|id| ctx.tree.get(id)) else {
            return;
        };
        self.updates.status += 1;
        let render_failed = self.error.is_some() && node.status() != NodeStatus::Error;
        self.apply_status(ctx, node);
        if render_failed {
            self.classes.error = true;
        }
    }

    fn apply_status(&mut self, ctx: &RenderContext<'_>, node: &Node) {
        let node_id = self.node;
        let nav = ctx.nav;
        let active = node_id.is_some() && nav.active_node == node_id;
        let resolved_checkbox = ctx.types.resolve(node, ctx.checkbox).checkbox;

        self.checkbox = resolved_checkbox.then_some(node.selection());
        self.expander = match node.status() {
            NodeStatus::Loading => Expander::Loading,
            _ if !node.is_expandable() => Expander::None,
            _ if node.is_expanded() => Expander::Expanded,
            _ => Expander::Collapsed,
        };
        self.classes.active = active;
        self.classes.focused = active && nav.focused;
        self.classes.cell_mode = active && nav.mode.is_cell_mode();
        self.classes.checked = node.selection() == Selection::Checked;
        self.classes.partial = node.selection() == Selection::Partial;
        self.classes.loading = node.status() == NodeStatus::Loading;
        self.classes.error = node.status() == NodeStatus::Error;
        self.classes.no_data = node.status() == NodeStatus::NoData;
        if node.status() == NodeStatus::Error {
            self.error = node.status_message().map(str::to_string);
        }

        for cell in &mut self.cells {
            cell.active = node_id.is_some_and(|id| nav.is_active_cell(id, cell.column));
            cell.editing = cell.active
                && ctx
                    .edit
                    .is_some_and(|e| Some(e.node) == node_id && e.column == cell.column);
        }
    }
}

/// Header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Column id.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Left edge.
    pub left: u32,
    /// Width.
    pub width: u32,
    /// Column is the active column in a cell mode.
    pub active: bool,
}

/// Header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderElement {
    cells: Vec<HeaderCell>,
    renders: u32,
}

impl HeaderElement {
    /// Header cells in column order.
    pub fn cells(&self) -> &[HeaderCell] {
        &self.cells
    }

    /// Number of times the header was rebuilt.
    pub fn renders(&self) -> u32 {
        self.renders
    }

    pub(crate) fn mark_active(&mut self, nav: &NavigationState) {
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.active = nav.mode.is_cell_mode() && nav.active_column == index;
        }
    }

    pub(crate) fn render(&mut self, ctx: &RenderContext<'_>) {
        self.renders += 1;
        self.cells = ctx
            .columns
            .iter()
            .zip(ctx.geometry.columns())
            .enumerate()
            .map(|(index, (column, layout))| HeaderCell {
                id: column.id.clone(),
                title: column.title.clone(),
                left: layout.offset,
                width: layout.width,
                active: ctx.nav.mode.is_cell_mode() && ctx.nav.active_column == index,
            })
            .collect();
    }
}
