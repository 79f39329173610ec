//! Viewport virtualization.
//!
//! Only rows inside the visible window, widened by a prefetch margin, are
//! materialized. Each materialized row owns a pooled [`RowElement`]; rows
//! leaving the window return their element to the pool for reuse.

use super::row::{ElementId, HeaderElement, RenderContext, RowElement};
use super::scheduler::{ChangeKind, ChangeScope};
use crate::model::NodeId;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Default row height in surface units (terminal lines).
pub const DEFAULT_ROW_HEIGHT: u32 = 1;

/// Default rows materialized beyond each edge of the visible window.
pub const DEFAULT_PREFETCH_ROWS: usize = 5;

/// Row metrics passed to the viewport at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportConfig {
    /// Height of every row.
    pub row_height: u32,
    /// Prefetch margin in rows.
    pub prefetch_rows: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            prefetch_rows: DEFAULT_PREFETCH_ROWS,
        }
    }
}

/// Half-open range of row indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    /// First row (inclusive).
    pub start: usize,
    /// Last row (exclusive).
    pub end: usize,
}

impl RowRange {
    /// Create a range.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `index` is inside the range.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Row indices in the range.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Rows to materialize for a scroll position.
///
/// The visible window is `floor(scroll_top / row_height)` plus
/// `ceil(viewport_height / row_height)` rows, widened by the prefetch
/// margin on both ends and clamped to `[0, total_rows)`.
pub fn compute_row_range(
    scroll_top: u32,
    viewport_height: u32,
    total_rows: usize,
    config: &ViewportConfig,
) -> RowRange {
    if total_rows == 0 || config.row_height == 0 {
        return RowRange::default();
    }
    let visible_start = (scroll_top / config.row_height) as usize;
    let visible_end = visible_start + viewport_height.div_ceil(config.row_height) as usize;
    let start = visible_start
        .saturating_sub(config.prefetch_rows)
        .min(total_rows);
    let end = visible_end
        .saturating_add(config.prefetch_rows)
        .min(total_rows);
    RowRange::new(start, end)
}

/// Element pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Elements allocated.
    pub created: u64,
    /// Elements taken from the pool.
    pub reused: u64,
    /// Elements returned to the pool.
    pub released: u64,
}

/// What a flush did to the viewport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// The viewport was rebuilt.
    pub rebuild: bool,
    /// Header was re-rendered.
    pub header: bool,
    /// Rows filled from scratch.
    pub rows_rendered: usize,
    /// Rows whose content or classes were refreshed.
    pub rows_updated: usize,
    /// Rows that only moved.
    pub rows_repositioned: usize,
    /// Rows whose content failed to render.
    pub rows_failed: Vec<NodeId>,
}

impl FlushReport {
    pub(crate) fn merge(&mut self, other: FlushReport) {
        self.rebuild |= other.rebuild;
        self.header |= other.header;
        self.rows_rendered += other.rows_rendered;
        self.rows_updated += other.rows_updated;
        self.rows_repositioned += other.rows_repositioned;
        self.rows_failed.extend(other.rows_failed);
    }
}

/// Scroll state, materialized rows and the element pool.
#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    scroll_top: u32,
    width: u32,
    height: u32,
    range: RowRange,
    rows: BTreeMap<NodeId, RowElement>,
    pool: Vec<RowElement>,
    header: HeaderElement,
    stats: PoolStats,
    next_element: u64,
}

impl Viewport {
    /// Create an empty viewport.
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            scroll_top: 0,
            width: 0,
            height: 0,
            range: RowRange::default(),
            rows: BTreeMap::new(),
            pool: Vec::new(),
            header: HeaderElement::default(),
            stats: PoolStats::default(),
            next_element: 0,
        }
    }

    /// Row metrics.
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Scroll offset.
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Container width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Container height, excluding the header.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rows materialized by the last flush.
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Header element.
    pub fn header(&self) -> &HeaderElement {
        &self.header
    }

    /// Pool counters.
    pub fn pool_stats(&self) -> PoolStats {
        self.stats
    }

    /// Elements waiting in the pool.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Element currently showing `node`.
    pub fn row_for(&self, node: NodeId) -> Option<&RowElement> {
        self.rows.get(&node)
    }

    /// Materialized rows sorted by row index.
    pub fn rows(&self) -> Vec<&RowElement> {
        let mut rows: Vec<&RowElement> = self.rows.values().collect();
        rows.sort_by_key(|r| r.row_index());
        rows
    }

    /// Number of materialized rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whole rows that fit in the container, at least 1.
    pub fn page_rows(&self) -> usize {
        if self.config.row_height == 0 {
            return 1;
        }
        ((self.height / self.config.row_height) as usize).max(1)
    }

    /// Largest valid scroll offset for `total_rows`.
    pub fn max_scroll_top(&self, total_rows: usize) -> u32 {
        (total_rows as u32)
            .saturating_mul(self.config.row_height)
            .saturating_sub(self.height)
    }

    /// Set the container size. Returns `(width_changed, height_changed)`.
    pub fn set_size(&mut self, width: u32, height: u32) -> (bool, bool) {
        let changed = (self.width != width, self.height != height);
        self.width = width;
        self.height = height;
        changed
    }

    /// Set the scroll offset, clamped. Returns whether it changed.
    pub fn set_scroll_top(&mut self, scroll_top: u32, total_rows: usize) -> bool {
        let clamped = scroll_top.min(self.max_scroll_top(total_rows));
        let changed = clamped != self.scroll_top;
        self.scroll_top = clamped;
        changed
    }

    /// Scroll by whole rows. Returns whether the offset changed.
    pub fn scroll_by_rows(&mut self, delta: i64, total_rows: usize) -> bool {
        let step = i64::from(self.config.row_height).saturating_mul(delta);
        let target = i64::from(self.scroll_top)
            .saturating_add(step)
            .clamp(0, i64::from(u32::MAX));
        self.set_scroll_top(target as u32, total_rows)
    }

    /// Scroll the minimum amount to show `row_index` fully.
    pub fn scroll_into_view(&mut self, row_index: usize, total_rows: usize) -> bool {
        let rh = self.config.row_height;
        let top = (row_index as u32).saturating_mul(rh);
        let target = if top < self.scroll_top {
            top
        } else if top + rh > self.scroll_top + self.height {
            (top + rh).saturating_sub(self.height)
        } else {
            return false;
        };
        self.set_scroll_top(target, total_rows)
    }

    /// Row index under a vertical position inside the container.
    pub fn row_at(&self, y: u32) -> Option<usize> {
        if self.config.row_height == 0 || y >= self.height {
            return None;
        }
        Some(((self.scroll_top + y) / self.config.row_height) as usize)
    }

    fn acquire(&mut self) -> RowElement {
        if let Some(element) = self.pool.pop() {
            self.stats.reused += 1;
            element
        } else {
            self.stats.created += 1;
            self.next_element += 1;
            RowElement::new(ElementId::new(self.next_element))
        }
    }

    fn release(&mut self, mut element: RowElement) {
        element.release();
        self.stats.released += 1;
        self.pool.push(element);
    }

    /// Recompute the window and release rows that left it.
    ///
    /// Returns the node for each row index in the new window.
    fn reconcile_window(&mut self, visible: &[NodeId]) -> Vec<(usize, NodeId)> {
        let clamped = self.scroll_top.min(self.max_scroll_top(visible.len()));
        self.scroll_top = clamped;
        self.range = compute_row_range(self.scroll_top, self.height, visible.len(), &self.config);
        let window: Vec<(usize, NodeId)> = self
            .range
            .indices()
            .map(|index| (index, visible[index]))
            .collect();
        let keep: HashSet<NodeId> = window.iter().map(|(_, node)| *node).collect();
        let leaving: Vec<NodeId> = self
            .rows
            .keys()
            .filter(|node| !keep.contains(node))
            .copied()
            .collect();
        for node in leaving {
            if let Some(element) = self.rows.remove(&node) {
                self.release(element);
            }
        }
        window
    }

    fn fill_row(
        &mut self,
        ctx: &RenderContext<'_>,
        mut element: RowElement,
        index: usize,
        node: NodeId,
        report: &mut FlushReport,
    ) {
        if let Err(err) = element.fill(ctx, node, index, self.config.row_height) {
            warn!(node = %node, error = %err, "row content failed to render");
            report.rows_failed.push(node);
        }
        report.rows_rendered += 1;
        self.rows.insert(node, element);
    }

    /// Regenerate every row in the window and the header.
    pub fn rebuild(&mut self, ctx: &RenderContext<'_>, visible: &[NodeId]) -> FlushReport {
        let mut report = FlushReport {
            rebuild: true,
            header: true,
            ..FlushReport::default()
        };
        self.header.render(ctx);
        for (index, node) in self.reconcile_window(visible) {
            let element = match self.rows.remove(&node) {
                Some(existing) => existing,
                None => self.acquire(),
            };
            self.fill_row(ctx, element, index, node, &mut report);
        }
        debug!(
            range_start = self.range.start,
            range_end = self.range.end,
            rows = self.rows.len(),
            pooled = self.pool.len(),
            "viewport rebuilt"
        );
        report
    }

    /// Apply a scroll change: reposition rows that stay, fill rows that
    /// enter, release rows that leave.
    pub fn sync_scroll(&mut self, ctx: &RenderContext<'_>, visible: &[NodeId]) -> FlushReport {
        let mut report = FlushReport::default();
        for (index, node) in self.reconcile_window(visible) {
            let row_height = self.config.row_height;
            match self.rows.get_mut(&node) {
                Some(existing) => {
                    if existing.reposition(index, row_height) {
                        report.rows_repositioned += 1;
                    }
                }
                None => {
                    let element = self.acquire();
                    self.fill_row(ctx, element, index, node, &mut report);
                }
            }
        }
        report
    }

    /// Re-render the header for new geometry and rebuild every row's cells.
    pub fn refresh_header(&mut self, ctx: &RenderContext<'_>) -> FlushReport {
        self.header.render(ctx);
        let mut report = self.refresh(ctx, ChangeScope::Tree, ChangeKind::Row);
        report.header = true;
        report
    }

    /// Apply a row, data or status change to one row or all rows.
    ///
    /// Node-scoped changes for rows outside the window are dropped; the
    /// row is filled fresh when it enters.
    pub fn refresh(
        &mut self,
        ctx: &RenderContext<'_>,
        scope: ChangeScope,
        kind: ChangeKind,
    ) -> FlushReport {
        let mut report = FlushReport::default();
        let targets: Vec<NodeId> = match scope {
            ChangeScope::Tree => self.rows.keys().copied().collect(),
            ChangeScope::Node(node) if self.rows.contains_key(&node) => vec![node],
            ChangeScope::Node(_) => Vec::new(),
        };
        if kind == ChangeKind::Status {
            self.header.mark_active(ctx.nav);
        }
        let row_height = self.config.row_height;
        for node in targets {
            let Some(element) = self.rows.get_mut(&node) else {
                continue;
            };
            let result = match kind {
                ChangeKind::Row => {
                    let index = element.row_index();
                    element.fill(ctx, node, index, row_height)
                }
                ChangeKind::Data => element.refresh_data(ctx),
                _ => {
                    element.refresh_status(ctx);
                    Ok(())
                }
            };
            if let Err(err) = result {
                warn!(node = %node, error = %err, "row content failed to render");
                report.rows_failed.push(node);
            }
            report.rows_updated += 1;
        }
        report
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
