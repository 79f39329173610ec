//! The tree grid control.
//!
//! [`TreeGrid`] owns the tree, the column set, the navigation state, the
//! change scheduler and the viewport. Every mutation goes through
//! [`TreeGrid::request_change`] or one of the operations built on it, and
//! nothing renders until the host calls [`TreeGrid::on_tick`] once per
//! display refresh.

mod events;
mod expansion;
mod navigation;
mod pointer;

#[cfg(test)]
mod fixtures;

pub use events::{GridEvent, Origin};
pub use navigation::ActivateOptions;
pub use pointer::ClickTarget;

use crate::input::KeyBindings;
use crate::layout::{resolve_columns, validate_columns, ColumnDef, ColumnGeometry, TitleMetrics};
use crate::model::{Action, LayoutError, NodeId, NodeTypeRegistry, Tree};
use crate::nav::{
    EditSession, GenericNavigationHandler, KeyHandler, NavigationMode, NavigationPolicy,
    NavigationState, NodeFacts, PreemptionHandler,
};
use crate::render::{
    CellSource, ChangeKind, ChangeScheduler, ChangeScope, DataCellSource, FlushPlan, FlushReport,
    RenderContext, SchedulerStats, Viewport, ViewportConfig,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Built-in handlers at the end of the key handler chain.
const BUILTIN_HANDLERS: usize = 2;

/// Runtime options fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Row height and prefetch margin.
    pub viewport: ViewportConfig,
    /// Which navigation modes are allowed.
    pub navigation: NavigationPolicy,
    /// Propagate checkbox changes to descendants and ancestors.
    pub cascade_select: bool,
    /// Show checkboxes unless a node type says otherwise.
    pub checkbox: bool,
    /// Log rejected navigation at warn instead of debug.
    pub warn_on_noop: bool,
    /// Keyboard movement activates the node it lands on.
    pub auto_activate: bool,
    /// Title cell part widths for pointer hit testing.
    pub title_metrics: TitleMetrics,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            navigation: NavigationPolicy::default(),
            cascade_select: true,
            checkbox: false,
            warn_on_noop: false,
            auto_activate: true,
            title_metrics: TitleMetrics::default(),
        }
    }
}

/// Virtualized, keyboard-driven tree grid.
pub struct TreeGrid {
    tree: Tree,
    columns: Vec<ColumnDef>,
    geometry: ColumnGeometry,
    types: NodeTypeRegistry,
    source: Box<dyn CellSource>,
    options: GridOptions,
    nav: NavigationState,
    edit: Option<EditSession>,
    scheduler: ChangeScheduler,
    viewport: Viewport,
    visible: Vec<NodeId>,
    bindings: KeyBindings,
    handlers: Vec<Arc<dyn KeyHandler>>,
    events: Vec<GridEvent>,
    /// Who is driving the grid right now.
    input_origin: Origin,
    /// `User` once keyboard or pointer input requested a pending change.
    flush_origin: Origin,
}

impl TreeGrid {
    /// Create a grid over `tree`.
    ///
    /// An empty column list gets a single title column. Geometry is
    /// resolved once the host reports a container size with
    /// [`set_viewport_size`](Self::set_viewport_size).
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for invalid column declarations.
    pub fn new(
        mut tree: Tree,
        columns: Vec<ColumnDef>,
        options: GridOptions,
    ) -> Result<Self, LayoutError> {
        let columns = with_title_column(columns);
        validate_columns(&columns)?;
        if options.cascade_select {
            tree.recompute_selection();
        }
        let nav = NavigationState {
            mode: options.navigation.initial_mode(),
            ..NavigationState::default()
        };
        let visible = tree.visible_nodes(false);
        let mut scheduler = ChangeScheduler::new();
        scheduler.request_change(ChangeKind::Structure, ChangeScope::Tree);
        info!(
            nodes = tree.len(),
            columns = columns.len(),
            policy = ?options.navigation,
            "tree grid created"
        );
        Ok(Self {
            viewport: Viewport::new(options.viewport),
            tree,
            columns,
            geometry: ColumnGeometry::default(),
            types: NodeTypeRegistry::new(),
            source: Box::new(DataCellSource),
            options,
            nav,
            edit: None,
            scheduler,
            visible,
            bindings: KeyBindings::default(),
            handlers: vec![
                Arc::new(PreemptionHandler),
                Arc::new(GenericNavigationHandler),
            ],
            events: Vec::new(),
            input_origin: Origin::Api,
            flush_origin: Origin::Api,
        })
    }

    /// Use a node type registry.
    pub fn with_node_types(mut self, types: NodeTypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Use a custom cell content source.
    pub fn with_cell_source(mut self, source: impl CellSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Use custom key bindings.
    pub fn with_key_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Add a key handler that runs before the built-in ones, after any
    /// handler added earlier.
    pub fn push_key_handler(&mut self, handler: Arc<dyn KeyHandler>) {
        let at = self.handlers.len().saturating_sub(BUILTIN_HANDLERS);
        self.handlers.insert(at, handler);
    }

    // ===== Accessors =====

    /// Node tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Column declarations.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of columns, title column included.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Resolved column geometry, empty until a width is known.
    pub fn geometry(&self) -> &ColumnGeometry {
        &self.geometry
    }

    /// Node type registry.
    pub fn node_types(&self) -> &NodeTypeRegistry {
        &self.types
    }

    /// Options the grid was built with, with the current policy.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Current navigation policy.
    pub fn policy(&self) -> NavigationPolicy {
        self.options.navigation
    }

    /// Navigation state.
    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    /// Current mode.
    pub fn mode(&self) -> NavigationMode {
        self.nav.mode
    }

    /// Active node.
    pub fn active_node(&self) -> Option<NodeId> {
        self.nav.active_node
    }

    /// Active column.
    pub fn active_column(&self) -> usize {
        self.nav.active_column
    }

    /// Open inline edit.
    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Viewport with the materialized rows.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Visible-node sequence shared by rendering and navigation.
    pub fn visible_nodes(&self) -> &[NodeId] {
        &self.visible
    }

    /// Scheduler counters.
    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Whether a flush is waiting for the next tick.
    pub fn needs_flush(&self) -> bool {
        self.scheduler.is_tick_scheduled()
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn active_facts(&self) -> Option<NodeFacts> {
        let node = self.nav.active_node?;
        let editable = self
            .tree
            .get(node)
            .zip(self.columns.get(self.nav.active_column))
            .and_then(|(n, column)| self.types.editable_input(n, &column.id));
        Some(NodeFacts::of(&self.tree, node, editable))
    }

    pub(crate) fn log_noop(&self, action: Action, reason: &str) {
        if self.options.warn_on_noop {
            warn!(?action, mode = %self.nav.mode, reason, "navigation ignored");
        } else {
            debug!(?action, mode = %self.nav.mode, reason, "navigation ignored");
        }
    }

    // ===== Scheduling =====

    /// Request a redraw.
    ///
    /// Without `immediate` the change is merged into the pending set and
    /// applied on the next [`on_tick`](Self::on_tick). With `immediate`
    /// just this change is applied now and its report returned.
    pub fn request_change(
        &mut self,
        kind: ChangeKind,
        scope: ChangeScope,
        immediate: bool,
    ) -> Option<FlushReport> {
        if !immediate {
            self.request(kind, scope);
            return None;
        }
        let plan = self.scheduler.take_immediate(kind, scope)?;
        let report = self.apply_plan(plan);
        self.events.push(GridEvent::FlushCompleted {
            report: report.clone(),
            immediate: true,
            origin: Origin::Api,
        });
        Some(report)
    }

    pub(crate) fn request(&mut self, kind: ChangeKind, scope: ChangeScope) {
        if self.input_origin == Origin::User {
            self.flush_origin = Origin::User;
        }
        self.scheduler.request_change(kind, scope);
    }

    /// Run `f` as keyboard or pointer input, so the changes it requests
    /// are attributed to the user.
    pub(crate) fn as_user<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.input_origin, Origin::User);
        let result = f(self);
        self.input_origin = previous;
        result
    }

    /// Display refresh. Applies every pending change in one flush.
    ///
    /// The [`GridEvent::FlushCompleted`] it emits carries [`Origin::User`]
    /// if any of the applied changes came from keyboard or pointer input.
    ///
    /// Returns `None` when nothing was pending.
    pub fn on_tick(&mut self) -> Option<FlushReport> {
        let plan = self.scheduler.begin_flush()?;
        let report = self.apply_plan(plan);
        self.scheduler.end_flush();
        debug!(
            rebuild = report.rebuild,
            rendered = report.rows_rendered,
            updated = report.rows_updated,
            repositioned = report.rows_repositioned,
            failed = report.rows_failed.len(),
            "flush completed"
        );
        let origin = std::mem::replace(&mut self.flush_origin, Origin::Api);
        self.events.push(GridEvent::FlushCompleted {
            report: report.clone(),
            immediate: false,
            origin,
        });
        Some(report)
    }

    fn apply_plan(&mut self, plan: FlushPlan) -> FlushReport {
        let ctx = RenderContext {
            tree: &self.tree,
            columns: &self.columns,
            geometry: &self.geometry,
            types: &self.types,
            source: self.source.as_ref(),
            nav: &self.nav,
            edit: self.edit.as_ref(),
            checkbox: self.options.checkbox,
        };
        match plan {
            FlushPlan::Rebuild => self.viewport.rebuild(&ctx, &self.visible),
            FlushPlan::Partial(items) => {
                let mut report = FlushReport::default();
                for (scope, kind) in items {
                    // Tree-wide kinds subsume a scroll sync.
                    if scope == ChangeScope::Tree {
                        report.merge(self.viewport.sync_scroll(&ctx, &self.visible));
                    }
                    match kind {
                        ChangeKind::Vscroll => {}
                        ChangeKind::Header => report.merge(self.viewport.refresh_header(&ctx)),
                        _ => report.merge(self.viewport.refresh(&ctx, scope, kind)),
                    }
                }
                report
            }
        }
    }

    pub(crate) fn structure_changed(&mut self) {
        self.visible = self.tree.visible_nodes(false);
        self.request(ChangeKind::Structure, ChangeScope::Tree);
    }

    // ===== Geometry and scrolling =====

    /// Report the container size. Width changes re-resolve the columns.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the columns cannot be resolved for
    /// the new width. Nothing is applied in that case.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) -> Result<(), LayoutError> {
        if width != self.viewport.width() || self.geometry.is_empty() {
            self.geometry = resolve_columns(&self.columns, width).inspect_err(|err| {
                warn!(width, error = %err, "column layout rejected");
            })?;
            self.request(ChangeKind::Header, ChangeScope::Tree);
        }
        let (_, height_changed) = self.viewport.set_size(width, height);
        if height_changed {
            self.request(ChangeKind::Vscroll, ChangeScope::Tree);
        }
        Ok(())
    }

    /// Replace the column set.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] for invalid declarations, leaving the
    /// previous columns and geometry in force.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef>) -> Result<(), LayoutError> {
        let columns = with_title_column(columns);
        let geometry = match self.viewport.width() {
            0 => {
                validate_columns(&columns)?;
                ColumnGeometry::default()
            }
            width => resolve_columns(&columns, width)?,
        };
        if self.edit.is_some() {
            self.cancel_edit();
        }
        self.columns = columns;
        self.geometry = geometry;
        self.nav.active_column = self.nav.active_column.min(self.columns.len().saturating_sub(1));
        self.request(ChangeKind::Header, ChangeScope::Tree);
        Ok(())
    }

    /// Scroll by whole rows. Returns whether the offset changed.
    pub fn scroll_by(&mut self, rows: i64) -> bool {
        let changed = self.viewport.scroll_by_rows(rows, self.visible.len());
        if changed {
            self.request(ChangeKind::Vscroll, ChangeScope::Tree);
        }
        changed
    }

    /// Set the scroll offset. Returns whether it changed.
    pub fn set_scroll_top(&mut self, scroll_top: u32) -> bool {
        let changed = self.viewport.set_scroll_top(scroll_top, self.visible.len());
        if changed {
            self.request(ChangeKind::Vscroll, ChangeScope::Tree);
        }
        changed
    }

    pub(crate) fn scroll_to(&mut self, node: NodeId) {
        let Some(index) = self.visible.iter().position(|n| *n == node) else {
            return;
        };
        if self.viewport.scroll_into_view(index, self.visible.len()) {
            self.request(ChangeKind::Vscroll, ChangeScope::Tree);
        }
    }

    /// Give or take input focus.
    pub fn set_focus(&mut self, focused: bool) {
        if self.nav.focused == focused {
            return;
        }
        self.nav.focused = focused;
        if !focused && self.edit.is_some() {
            self.commit_edit();
        }
        let scope = self.nav.active_node.map_or(ChangeScope::Tree, ChangeScope::Node);
        self.request(ChangeKind::Status, scope);
    }
}

fn with_title_column(columns: Vec<ColumnDef>) -> Vec<ColumnDef> {
    if columns.is_empty() {
        vec![ColumnDef::title_column("")]
    } else {
        columns
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
